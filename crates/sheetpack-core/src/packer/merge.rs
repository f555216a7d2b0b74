use std::collections::BTreeSet;

use tracing::trace;

use super::FreeList;
use crate::model::Rect;

fn join_horizontal(a: &Rect, b: &Rect) -> Option<Rect> {
    if a.h != b.h || a.y != b.y {
        return None;
    }
    if a.x != b.right_edge() && b.x != a.right_edge() {
        return None;
    }
    let x = a.x.min(b.x);
    Some(Rect::new(x, a.y, a.right_edge().max(b.right_edge()) - x, a.h))
}

fn join_vertical(a: &Rect, b: &Rect) -> Option<Rect> {
    if a.w != b.w || a.x != b.x {
        return None;
    }
    if a.y != b.bottom_edge() && b.y != a.bottom_edge() {
        return None;
    }
    let y = a.y.min(b.y);
    Some(Rect::new(a.x, y, a.w, a.bottom_edge().max(b.bottom_edge()) - y))
}

impl FreeList {
    /// Coalesces adjacent free rectangles until no pair can be joined.
    ///
    /// Two rectangles join when they share a full edge: same row and height
    /// with touching sides, or same column and width with touching top and
    /// bottom. The survivor keeps its index and overlay color; absorbed
    /// rectangles are removed once the pass reaches a fixed point. Returns
    /// the number of rectangles removed.
    pub fn merge(&mut self) -> usize {
        let mut absorbed: BTreeSet<usize> = BTreeSet::new();
        let rects = self.rects_mut();

        loop {
            let mut merged = false;
            for i in 0..rects.len() {
                if absorbed.contains(&i) {
                    continue;
                }
                for j in 0..rects.len() {
                    if i == j || absorbed.contains(&j) {
                        continue;
                    }
                    let (a, b) = (rects[i].rect, rects[j].rect);
                    if let Some(joined) = join_horizontal(&a, &b) {
                        rects[i].rect = joined;
                        absorbed.insert(j);
                        merged = true;
                        // A side-by-side join restarts the scan for the next rectangle.
                        break;
                    } else if let Some(joined) = join_vertical(&a, &b) {
                        rects[i].rect = joined;
                        absorbed.insert(j);
                        merged = true;
                    }
                }
            }
            if !merged {
                break;
            }
        }

        for &idx in absorbed.iter().rev() {
            rects.remove(idx);
        }
        if !absorbed.is_empty() {
            trace!(removed = absorbed.len(), remaining = rects.len(), "merged free rects");
        }
        absorbed.len()
    }
}
