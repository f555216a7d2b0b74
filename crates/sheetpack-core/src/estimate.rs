use tracing::debug;

use crate::config::PackerConfig;
use crate::error::{Result, SheetPackError};
use crate::frame::{FrameSet, FrameSource};

/// Side of the square canvas placement starts from, given the summed frame
/// area.
///
/// The integer square root of the area is rounded up past the next multiple
/// of `size_alignment`, padded by `1/size_adjustment` of itself, then rounded
/// up past the next multiple of twice the alignment. The result is always
/// strictly larger than the square root, so the frames have some slack.
pub fn estimate_side(total_area: u64, cfg: &PackerConfig) -> Result<u32> {
    let align = u64::from(cfg.size_alignment);
    let adjust = u64::from(cfg.size_adjustment.max(1));

    let sq = total_area.isqrt();
    let z = (sq | align.saturating_sub(1)) + 1;
    let side = ((z + z / adjust) | (align * 2).saturating_sub(1)) + 1;

    debug!(total_area, sqrt = sq, side, "estimated sheet size");
    if side > u64::from(cfg.max_sheet_size) {
        return Err(SheetPackError::SheetTooLarge {
            estimate: side,
            max: cfg.max_sheet_size,
        });
    }
    // max_sheet_size is a u32, so the side fits.
    Ok(side as u32)
}

/// Initial square sheet side for `frames`.
///
/// Fails with [`SheetPackError::SheetTooLarge`] when the estimate exceeds
/// `cfg.max_sheet_size`.
pub fn estimate_sheet_size<F: FrameSource>(frames: &FrameSet<F>, cfg: &PackerConfig) -> Result<u32> {
    estimate_side(frames.total_area(), cfg)
}
