use image::RgbaImage;
use tracing::{debug, info, instrument, warn};

use crate::compositing::compose_sheet;
use crate::config::PackerConfig;
use crate::error::{Result, SheetPackError};
use crate::estimate::estimate_side;
use crate::frame::{FrameSet, FrameSource};
use crate::metadata::encode_metadata;
use crate::model::{PackStats, SheetLayout, SheetSize, Sprite};
use crate::packer::{DebugColors, FreeList, Palette};
use crate::verify::{check_overlaps, check_pixmap};

/// Result of a full packing run.
#[derive(Debug, Clone)]
pub struct PackOutput {
    pub layout: SheetLayout,
    /// Composed sheet, `layout.size` pixels.
    pub sheet: RgbaImage,
    /// Encoded placement block, see [`crate::metadata`].
    pub metadata: Vec<u8>,
}

impl PackOutput {
    pub fn stats(&self) -> &PackStats {
        &self.layout.stats
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.layout.sprites
    }
}

fn check_sizes(sizes: &[(u32, u32)]) -> Result<()> {
    if sizes.is_empty() {
        return Err(SheetPackError::Empty);
    }
    if let Some((id, (w, h))) = sizes
        .iter()
        .enumerate()
        .find(|(_, (w, h))| *w == 0 || *h == 0)
    {
        return Err(SheetPackError::InvalidInput(format!(
            "frame {id} has no area ({w}x{h})"
        )));
    }
    Ok(())
}

/// Order frames are visited in. Stable, so equal heights keep input order.
fn visit_order(sizes: &[(u32, u32)], sort_by_height: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    if sort_by_height {
        order.sort_by(|&a, &b| sizes[b].1.cmp(&sizes[a].1));
    }
    order
}

/// Places frames of the given sizes. Sprite ids are indices into `sizes`.
fn place_sizes(
    sizes: &[(u32, u32)],
    cfg: &PackerConfig,
    colors: &mut dyn DebugColors,
) -> Result<SheetLayout> {
    cfg.validate()?;
    check_sizes(sizes)?;

    let total_area: u64 = sizes
        .iter()
        .map(|&(w, h)| u64::from(w) * u64::from(h))
        .sum();
    let estimate = estimate_side(total_area, cfg)?;

    let mut canvas = SheetSize::square(estimate);
    let mut sprites: Vec<Sprite> = sizes
        .iter()
        .enumerate()
        .map(|(id, &(w, h))| Sprite::unplaced(id, w, h))
        .collect();
    let mut free = FreeList::seeded(canvas, colors);
    let mut unplaced = Vec::new();
    let mut growths = 0usize;

    for idx in visit_order(sizes, cfg.sort_by_height) {
        let (w, h) = sizes[idx];
        let slot = match free.best_fit(w, h) {
            Some(slot) => Some(slot),
            None => match free.grow(w, h, &mut canvas, colors) {
                Some(_) => {
                    let slot = free.best_fit(w, h);
                    if slot.is_some() {
                        growths += 1;
                    }
                    slot
                }
                None => None,
            },
        };
        let Some(slot) = slot else {
            warn!(id = idx, w, h, "no room for frame");
            unplaced.push(idx);
            continue;
        };

        let Some(target) = free.get(slot).copied() else {
            continue;
        };
        sprites[idx].position = Some((target.x, target.y));
        debug!(id = idx, x = target.x, y = target.y, w, h, "placed frame");
        free.subdivide(slot, w, h, colors);
        free.merge();

        if cfg!(debug_assertions) {
            let pairs = free.overlapping_pairs();
            if !pairs.is_empty() {
                warn!(id = idx, ?pairs, "free rectangles overlap");
            }
        }
    }

    let size = tight_bounds(&sprites);
    let stats = PackStats::collect(&sprites, size, growths, free.len());
    info!(
        frames = stats.frames,
        placed = stats.placed,
        unplaced = stats.unplaced,
        growths,
        estimate,
        width = size.width,
        height = size.height,
        occupancy = stats.occupancy,
        "placement finished"
    );
    Ok(SheetLayout {
        size,
        estimate,
        canvas,
        sprites,
        free_rects: free.into_inner(),
        unplaced,
        stats,
    })
}

/// Smallest canvas holding every placed sprite. Unplaced sprites do not count.
pub fn tight_bounds(sprites: &[Sprite]) -> SheetSize {
    sprites
        .iter()
        .filter_map(Sprite::rect)
        .fold(SheetSize::default(), |acc, r| {
            SheetSize::new(acc.width.max(r.right_edge()), acc.height.max(r.bottom_edge()))
        })
}

/// Computes sprite positions for `frames` without touching pixels.
///
/// `colors` supplies the overlay color of each free rectangle created on
/// the way; it has no effect on placement.
#[instrument(skip_all, fields(frames = frames.len()))]
pub fn place_sprites<F: FrameSource>(
    frames: &FrameSet<F>,
    cfg: &PackerConfig,
    colors: &mut dyn DebugColors,
) -> Result<SheetLayout> {
    place_sizes(&frames.sizes(), cfg, colors)
}

/// Layout-only packing from plain `(width, height)` pairs.
#[instrument(skip_all, fields(frames = sizes.len()))]
pub fn pack_layout(sizes: &[(u32, u32)], cfg: &PackerConfig) -> Result<SheetLayout> {
    place_sizes(sizes, cfg, &mut Palette::default())
}

/// Packs `frames` into one sheet using the default overlay palette.
pub fn pack_frames<F: FrameSource>(frames: &FrameSet<F>, cfg: &PackerConfig) -> Result<PackOutput> {
    pack_frames_with(frames, cfg, &mut Palette::default())
}

/// Places, composes and encodes `frames`.
///
/// With `cfg.verify` the composed sheet is checked for overlapping sprites
/// and pixel differences before the metadata is encoded.
#[instrument(skip_all, fields(frames = frames.len()))]
pub fn pack_frames_with<F: FrameSource>(
    frames: &FrameSet<F>,
    cfg: &PackerConfig,
    colors: &mut dyn DebugColors,
) -> Result<PackOutput> {
    let layout = place_sprites(frames, cfg, colors)?;
    let sheet = compose_sheet(&layout, frames, cfg.debug_overlay);

    if cfg.verify {
        let placed: Vec<Sprite> = layout
            .sprites
            .iter()
            .filter(|s| s.is_placed())
            .copied()
            .collect();
        check_overlaps(&placed)?;
        check_pixmap(&sheet, &placed, frames)?;
        debug!(sprites = placed.len(), "sheet verified");
    }

    let metadata = encode_metadata(&layout.sprites)?;
    Ok(PackOutput {
        layout,
        sheet,
        metadata,
    })
}

/// Packs with default settings apart from the visiting order.
pub fn pack<F: FrameSource>(frames: &FrameSet<F>, sort_by_height: bool) -> Result<PackOutput> {
    let cfg = PackerConfig {
        sort_by_height,
        ..Default::default()
    };
    pack_frames(frames, &cfg)
}
