use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use image::ImageReader;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sheetpack_core::prelude::*;
use sheetpack_core::{to_json, to_json_hash};
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "sheetpack",
    about = "Pack image frames into a single sprite sheet",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack frames into a sheet (PNG + obLT block, optional JSON)
    Pack(PackArgs),
    /// Layout-only: compute placements from image headers and export JSON
    Layout(PackArgs),
    /// Decode an obLT block and list its records
    Inspect(InspectArgs),
    /// Simple timing bench (packs once, prints time + occupancy)
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Sheet base name (files will be name.png/.oblt/.json)
    #[arg(short, long, default_value = "sheet", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path; command line flags take precedence
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Visit frames in input order instead of tallest first
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    no_sort: bool,
    /// Largest accepted side of the estimated sheet
    #[arg(long, help_heading = "Layout")]
    max_sheet_size: Option<u32>,
    /// Alignment of the size estimate (power of two)
    #[arg(long, help_heading = "Layout")]
    size_alignment: Option<u32>,
    /// Padding divisor of the size estimate
    #[arg(long, help_heading = "Layout")]
    size_adjustment: Option<u32>,

    // Debug
    /// Paint leftover free rectangles onto the sheet
    #[arg(long, default_value_t = false, help_heading = "Debug")]
    debug_overlay: bool,
    /// Seed for random overlay colors (default: fixed palette)
    #[arg(long, help_heading = "Debug")]
    debug_seed: Option<u64>,
    /// Check the composed sheet for overlaps and pixel differences
    #[arg(long, default_value_t = false, help_heading = "Debug")]
    verify: bool,

    // Export
    /// Also write name.json describing the sheet
    #[arg(long, default_value_t = false, help_heading = "Export")]
    json: bool,
    /// JSON shape: array | hash
    #[arg(long, default_value = "array", value_parser = ["array", "hash"], help_heading = "Export")]
    json_format: String,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct InspectArgs {
    /// obLT block written by `sheetpack pack`
    file: PathBuf,
    /// Print the decoded block as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Input directory
    input: PathBuf,
    /// Visit frames in input order instead of tallest first
    #[arg(long, default_value_t = false)]
    no_sort: bool,
    /// Number of timed runs
    #[arg(long, default_value_t = 1)]
    runs: u32,
}

/// Overlay colors drawn from a seeded RNG.
struct RandomColors(StdRng);

impl RandomColors {
    fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl DebugColors for RandomColors {
    fn next_color(&mut self) -> [u8; 4] {
        [self.0.r#gen(), self.0.r#gen(), self.0.r#gen(), 255]
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => run_layout(args),
        Commands::Inspect(args) => run_inspect(args),
        Commands::Bench(b) => run_bench(b),
    }
}

fn build_config(cli: &PackArgs) -> anyhow::Result<PackerConfig> {
    let mut cfg = PackerConfig::default();
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = y.into_packer_config(cfg);
    }
    if cli.no_sort {
        cfg.sort_by_height = false;
    }
    if let Some(v) = cli.max_sheet_size {
        cfg.max_sheet_size = v;
    }
    if let Some(v) = cli.size_alignment {
        cfg.size_alignment = v;
    }
    if let Some(v) = cli.size_adjustment {
        cfg.size_adjustment = v;
    }
    if cli.debug_overlay {
        cfg.debug_overlay = true;
    }
    if cli.verify {
        cfg.verify = true;
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Prints the config when asked. Returns true if the caller should stop.
fn maybe_print_config(cli: &PackArgs, cfg: &PackerConfig) -> anyhow::Result<bool> {
    if !cli.print_config {
        return Ok(false);
    }
    match cli.print_config_format.as_str() {
        "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
        _ => println!("{}", serde_json::to_string_pretty(cfg)?),
    }
    Ok(true)
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;
    if maybe_print_config(cli, &cfg)? {
        return Ok(());
    }

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    let frames = load_frames_with_progress(&cli.input, &paths, show_progress)?;
    info!(count = frames.len(), "loaded input frames");

    let start = Instant::now();
    let out = match cli.debug_seed {
        Some(seed) => pack_frames_with(&frames, &cfg, &mut RandomColors::new(seed))?,
        None => pack_frames(&frames, &cfg)?,
    };
    let dur = start.elapsed();
    for &id in &out.layout.unplaced {
        if let Some(frame) = frames.get(id) {
            warn!(key = %frame.key, w = frame.image.width(), h = frame.image.height(), "frame left out of sheet");
        }
    }
    info!(
        width = out.layout.size.width,
        height = out.layout.size.height,
        time = %fmt_dur(dur),
        "{}",
        out.stats().summary()
    );

    if cli.dry_run {
        return Ok(());
    }

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    let png_path = cli.out_dir.join(format!("{}.png", cli.name));
    out.sheet
        .save(&png_path)
        .with_context(|| format!("write {}", png_path.display()))?;
    let meta_path = cli.out_dir.join(format!("{}.oblt", cli.name));
    fs::write(&meta_path, &out.metadata)
        .with_context(|| format!("write {}", meta_path.display()))?;
    info!(png = %png_path.display(), metadata = %meta_path.display(), "wrote sheet");

    if cli.json {
        let keys: Vec<&str> = frames.iter().map(|f| f.key.as_str()).collect();
        write_json(cli, &out.layout, &keys)?;
    }
    Ok(())
}

fn run_layout(cli: &PackArgs) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;
    if maybe_print_config(cli, &cfg)? {
        return Ok(());
    }

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    let mut keys = Vec::with_capacity(paths.len());
    let mut sizes = Vec::with_capacity(paths.len());
    for p in &paths {
        match image::image_dimensions(p) {
            Ok(dim) => {
                keys.push(frame_key(&cli.input, p));
                sizes.push(dim);
            }
            Err(e) => error!(?p, error = %e, "skip image"),
        }
    }
    let layout = sheetpack_core::pack_layout(&sizes, &cfg)?;
    info!(
        width = layout.size.width,
        height = layout.size.height,
        "{}",
        layout.stats.summary()
    );

    if cli.dry_run {
        return Ok(());
    }
    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    write_json(cli, &layout, &keys)
}

fn write_json<K: ToString>(cli: &PackArgs, layout: &SheetLayout, keys: &[K]) -> anyhow::Result<()> {
    let value = match cli.json_format.as_str() {
        "hash" => to_json_hash(layout, keys),
        _ => to_json(layout, keys),
    };
    let path = cli.out_dir.join(format!("{}.json", cli.name));
    fs::write(&path, serde_json::to_string_pretty(&value)?)
        .with_context(|| format!("write {}", path.display()))?;
    info!(json = %path.display(), "wrote description");
    Ok(())
}

fn run_inspect(args: &InspectArgs) -> anyhow::Result<()> {
    let bytes = fs::read(&args.file).with_context(|| format!("read {}", args.file.display()))?;
    let meta = decode_metadata(&bytes).with_context(|| format!("decode {}", args.file.display()))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
        return Ok(());
    }
    println!(
        "version={} records={} placed={}",
        meta.version,
        meta.entries.len(),
        meta.placed().count()
    );
    for (id, e) in meta.entries.iter().enumerate() {
        match e.position {
            Some((x, y)) => println!("{id:>5}  {x:>5},{y:<5}  {}x{}", e.width, e.height),
            None => println!("{id:>5}  unplaced     {}x{}", e.width, e.height),
        }
    }
    Ok(())
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    let paths = gather_paths(&b.input, &[], &[])?;
    let frames = load_frames_with_progress(&b.input, &paths, false)?;
    let cfg = PackerConfig::builder().sort_by_height(!b.no_sort).build();
    let runs = b.runs.max(1);
    let mut best = Duration::MAX;
    let mut last = None;
    for _ in 0..runs {
        let start = Instant::now();
        let out = pack_frames(&frames, &cfg)?;
        best = best.min(start.elapsed());
        last = Some(out);
    }
    let Some(out) = last else {
        return Ok(());
    };
    println!(
        "frames={} size={}x{} unplaced={} growths={} occupancy={:.2}% time={}",
        out.stats().frames,
        out.layout.size.width,
        out.layout.size.height,
        out.stats().unplaced,
        out.stats().growths,
        out.stats().occupancy * 100.0,
        fmt_dur(best)
    );
    Ok(())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("bad glob {pat}"))?);
    }
    Ok(Some(b.build()?))
}

/// Image files under `path`, sorted by name so frame ids are stable.
fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    if list.is_empty() {
        anyhow::bail!("no images found under {}", path.display());
    }
    Ok(list)
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif")
    )
}

/// Frame name: path relative to the input root, with forward slashes.
fn frame_key(root: &Path, p: &Path) -> String {
    let rel = p.strip_prefix(root).ok().filter(|r| !r.as_os_str().is_empty());
    rel.unwrap_or(p).to_string_lossy().replace('\\', "/")
}

fn load_frames_with_progress(
    root: &Path,
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<FrameSet<InputFrame>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut frames = FrameSet::new();
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match ImageReader::open(p)
            .and_then(|r| r.with_guessed_format())
            .map_err(image::ImageError::IoError)
            .and_then(|r| r.decode())
        {
            Ok(img) => {
                frames.push(InputFrame::from_dynamic(frame_key(root, p), &img));
            }
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(frames)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

/// YAML config file. Every field is optional; missing ones keep their defaults.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct YamlConfig {
    sort_by_height: Option<bool>,
    max_sheet_size: Option<u32>,
    size_alignment: Option<u32>,
    size_adjustment: Option<u32>,
    debug_overlay: Option<bool>,
    verify: Option<bool>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> PackerConfig {
        if let Some(v) = self.sort_by_height {
            cfg.sort_by_height = v;
        }
        if let Some(v) = self.max_sheet_size {
            cfg.max_sheet_size = v;
        }
        if let Some(v) = self.size_alignment {
            cfg.size_alignment = v;
        }
        if let Some(v) = self.size_adjustment {
            cfg.size_adjustment = v;
        }
        if let Some(v) = self.debug_overlay {
            cfg.debug_overlay = v;
        }
        if let Some(v) = self.verify {
            cfg.verify = v;
        }
        cfg
    }
}
