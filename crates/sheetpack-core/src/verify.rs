//! Consistency checks for a finished sheet.
//!
//! Neither check is needed to produce a sheet. They back the test-suite and
//! the optional `verify` pass of the pipeline.

use image::RgbaImage;
use thiserror::Error;
use tracing::error;

use crate::frame::{FrameSet, FrameSource};
use crate::model::{Rect, Sprite};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanityError {
    #[error("sprites {a} and {b} overlap")]
    Overlap { a: usize, b: usize },
    #[error("sprite {id} has no position")]
    Unplaced { id: usize },
    #[error("sprite {id} has no source frame")]
    MissingFrame { id: usize },
    #[error("sprite {id} at {rect:?} lies outside the {width}x{height} sheet")]
    OutOfBounds {
        id: usize,
        rect: Rect,
        width: u32,
        height: u32,
    },
    #[error(
        "sprite {id} pixel ({x},{y}) is {found:02x?} on the sheet, expected {expected:02x?}"
    )]
    PixelMismatch {
        id: usize,
        x: u32,
        y: u32,
        found: [u8; 4],
        expected: [u8; 4],
    },
}

/// Fails on the first pair of placed sprites whose rectangles overlap.
///
/// Unplaced sprites are ignored.
pub fn check_overlaps(sprites: &[Sprite]) -> Result<(), SanityError> {
    let placed: Vec<(usize, Rect)> = sprites
        .iter()
        .filter_map(|s| s.rect().map(|r| (s.id, r)))
        .collect();
    for (i, (a_id, a)) in placed.iter().enumerate() {
        for (b_id, b) in &placed[i + 1..] {
            if a.intersects(b) {
                error!(a = a_id, b = b_id, "sprite rectangles intersect");
                return Err(SanityError::Overlap { a: *a_id, b: *b_id });
            }
        }
    }
    Ok(())
}

/// Compares every pixel of every sprite against its source frame.
///
/// Fails if a sprite has no position, has no frame in `frames`, does not fit
/// inside `sheet`, or any pixel differs.
pub fn check_pixmap<F: FrameSource>(
    sheet: &RgbaImage,
    sprites: &[Sprite],
    frames: &FrameSet<F>,
) -> Result<(), SanityError> {
    let (width, height) = sheet.dimensions();
    for sprite in sprites {
        let id = sprite.id;
        let Some(rect) = sprite.rect() else {
            error!(id, "unplaced sprite");
            return Err(SanityError::Unplaced { id });
        };
        let Some(frame) = frames.get(id) else {
            return Err(SanityError::MissingFrame { id });
        };
        if u64::from(rect.x) + u64::from(rect.w) > u64::from(width)
            || u64::from(rect.y) + u64::from(rect.h) > u64::from(height)
        {
            error!(id, ?rect, width, height, "sprite outside sheet");
            return Err(SanityError::OutOfBounds {
                id,
                rect,
                width,
                height,
            });
        }
        for y in 0..rect.h {
            for x in 0..rect.w {
                let found = sheet.get_pixel(rect.x + x, rect.y + y).0;
                let expected = frame.pixel(x, y).0;
                if found != expected {
                    error!(id, x, y, ?found, ?expected, "pixel mismatch");
                    return Err(SanityError::PixelMismatch {
                        id,
                        x,
                        y,
                        found,
                        expected,
                    });
                }
            }
        }
    }
    Ok(())
}
