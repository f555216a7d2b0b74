use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DebugColors, FreeList};
use crate::model::{Rect, SheetSize};

/// Which canvas edge was pushed out by [`FreeList::grow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowDirection {
    Right,
    Down,
}

impl FreeList {
    /// Extends the canvas so that a `w x h` frame fits.
    ///
    /// Rectangles are scanned in order. The first one that either touches the
    /// right edge and is tall enough, or touches the bottom edge and is wide
    /// enough, is stretched to the frame's width (resp. height). The canvas
    /// grows by the same amount and the rest of the new strip is covered with
    /// up to two margin rectangles. Returns `None` if no rectangle touches a
    /// growable edge.
    ///
    /// Meant to be called only after [`FreeList::best_fit`] failed for the
    /// same frame.
    pub fn grow(
        &mut self,
        w: u32,
        h: u32,
        size: &mut SheetSize,
        colors: &mut dyn DebugColors,
    ) -> Option<GrowDirection> {
        let (idx, direction) = self.rects().iter().enumerate().find_map(|(i, fr)| {
            let r = fr.rect;
            if r.right_edge() == size.width && r.h >= h {
                Some((i, GrowDirection::Right))
            } else if r.bottom_edge() == size.height && r.w >= w {
                Some((i, GrowDirection::Down))
            } else {
                None
            }
        })?;

        let r = self.rects()[idx].rect;
        let mut margins: Vec<Rect> = Vec::with_capacity(2);
        match direction {
            GrowDirection::Right => {
                let extra = w.saturating_sub(r.w);
                if r.y > 0 {
                    margins.push(Rect::new(size.width, 0, extra, r.y));
                }
                if r.bottom_edge() < size.height {
                    margins.push(Rect::new(
                        size.width,
                        r.bottom_edge(),
                        extra,
                        size.height - r.bottom_edge(),
                    ));
                }
                size.width += extra;
                self.rects_mut()[idx].rect.w = r.w + extra;
            }
            GrowDirection::Down => {
                let extra = h.saturating_sub(r.h);
                if r.x > 0 {
                    margins.push(Rect::new(0, size.height, r.x, extra));
                }
                if r.right_edge() < size.width {
                    margins.push(Rect::new(
                        r.right_edge(),
                        size.height,
                        size.width - r.right_edge(),
                        extra,
                    ));
                }
                size.height += extra;
                self.rects_mut()[idx].rect.h = r.h + extra;
            }
        }
        debug!(
            ?direction,
            rect = idx,
            width = size.width,
            height = size.height,
            margins = margins.len(),
            "grew sheet"
        );
        for m in margins {
            self.push(m, colors);
        }
        Some(direction)
    }
}
