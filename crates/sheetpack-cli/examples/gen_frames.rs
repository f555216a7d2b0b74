//! Writes a folder of randomly sized, numbered frames for trying out `sheetpack`.
//!
//! cargo run -p sheetpack-cli --example gen_frames -- [out_dir] [count] [seed]

use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;

fn random_color_opaque(rng: &mut impl Rng) -> [u8; 4] {
    [rng.r#gen(), rng.r#gen(), rng.r#gen(), 255]
}

fn draw_border(img: &mut RgbaImage, c: [u8; 4]) {
    let (w, h) = img.dimensions();
    for x in 0..w {
        img.put_pixel(x, 0, Rgba(c));
        img.put_pixel(x, h - 1, Rgba(c));
    }
    for y in 0..h {
        img.put_pixel(0, y, Rgba(c));
        img.put_pixel(w - 1, y, Rgba(c));
    }
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let out = PathBuf::from(args.next().unwrap_or_else(|| "frames".into()));
    let count: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(50);
    let seed: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(1);

    fs::create_dir_all(&out)?;
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    for i in 0..count {
        // Mostly small frames with the occasional long strip.
        let (w, h) = match rng.gen_range(0..10) {
            0 => (rng.gen_range(64..=160), rng.gen_range(4..=12)),
            1 => (rng.gen_range(4..=12), rng.gen_range(64..=160)),
            _ => (rng.gen_range(8..=48), rng.gen_range(8..=48)),
        };
        let mut img = RgbaImage::from_pixel(w, h, Rgba(random_color_opaque(&mut rng)));
        draw_border(&mut img, [0, 0, 0, 255]);
        img.save(out.join(format!("frame_{i:03}.png")))?;
    }
    println!("wrote {count} frames to {}", out.display());
    Ok(())
}
