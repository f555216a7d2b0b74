use super::DebugColors;
use crate::model::{FreeRect, Rect, SheetSize};

/// Unoccupied space on the sheet, kept as a dense list of rectangles.
///
/// Rectangles are addressed by index. Order matters: the best-fit scan
/// prefers earlier entries on ties, so removals keep the relative order of
/// the survivors and new rectangles are appended at the end.
#[derive(Debug, Clone, Default)]
pub struct FreeList {
    rects: Vec<FreeRect>,
}

impl FreeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// One free rectangle spanning the whole canvas.
    pub fn seeded(size: SheetSize, colors: &mut dyn DebugColors) -> Self {
        let mut list = Self::new();
        list.push(Rect::new(0, 0, size.width, size.height), colors);
        list
    }

    /// Builds a list from plain rectangles (transparent overlay color).
    pub fn from_rects(rects: impl IntoIterator<Item = Rect>) -> Self {
        Self {
            rects: rects
                .into_iter()
                .filter(|r| !r.is_empty())
                .map(|r| FreeRect::new(r, [0, 0, 0, 0]))
                .collect(),
        }
    }

    pub fn rects(&self) -> &[FreeRect] {
        &self.rects
    }

    pub fn get(&self, idx: usize) -> Option<&Rect> {
        self.rects.get(idx).map(|fr| &fr.rect)
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn into_inner(self) -> Vec<FreeRect> {
        self.rects
    }

    pub(crate) fn rects_mut(&mut self) -> &mut Vec<FreeRect> {
        &mut self.rects
    }

    /// Appends `rect` unless it has no area.
    pub(crate) fn push(&mut self, rect: Rect, colors: &mut dyn DebugColors) {
        if !rect.is_empty() {
            self.rects.push(FreeRect::new(rect, colors.next_color()));
        }
    }

    /// Picks the free rectangle a `w x h` frame should go into.
    ///
    /// Among rectangles large enough, the first one found is the initial
    /// candidate. A later rectangle replaces it when it is strictly shorter;
    /// or equally tall and higher up; or smaller in area and higher up.
    /// This fills rows from the top before opening new ones.
    pub fn best_fit(&self, w: u32, h: u32) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, fr) in self.rects.iter().enumerate() {
            let r = &fr.rect;
            if r.w < w || r.h < h {
                continue;
            }
            let Some(b) = best.map(|b| self.rects[b].rect) else {
                best = Some(i);
                continue;
            };
            if r.h < b.h
                || (r.h == b.h && r.y < b.y)
                || (r.area() < b.area() && r.y < b.y)
            {
                best = Some(i);
            }
        }
        best
    }

    /// Removes rectangle `idx` after a `w x h` frame was placed in its
    /// top-left corner and appends what is left of it.
    ///
    /// When the rectangle is at most twice as tall as the frame, the right
    /// remainder keeps the full height and the bottom remainder is only as
    /// wide as the frame. Otherwise the right remainder is cut at the frame's
    /// height and the bottom remainder spans the full width.
    pub fn subdivide(&mut self, idx: usize, w: u32, h: u32, colors: &mut dyn DebugColors) {
        let fr = self.rects.remove(idx).rect;
        let right_w = fr.w.saturating_sub(w);
        let bottom_h = fr.h.saturating_sub(h);

        if u64::from(fr.h) <= 2 * u64::from(h) {
            self.push(Rect::new(fr.x + w, fr.y, right_w, fr.h), colors);
            if h < fr.h {
                self.push(Rect::new(fr.x, fr.y + h, w, bottom_h), colors);
            }
        } else {
            self.push(Rect::new(fr.x + w, fr.y, right_w, h), colors);
            self.push(Rect::new(fr.x, fr.y + h, fr.w, bottom_h), colors);
        }
    }

    /// Index pairs of free rectangles that overlap each other.
    ///
    /// Subdivide, grow and merge are expected to keep this empty; placement
    /// reports violations instead of repairing them.
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.rects.len() {
            for j in (i + 1)..self.rects.len() {
                if self.rects[i].rect.intersects(&self.rects[j].rect) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::Palette;

    fn list(rects: &[(u32, u32, u32, u32)]) -> FreeList {
        FreeList::from_rects(rects.iter().map(|&(x, y, w, h)| Rect::new(x, y, w, h)))
    }

    fn plain(list: &FreeList) -> Vec<Rect> {
        list.rects().iter().map(|fr| fr.rect).collect()
    }

    #[test]
    fn best_fit_none_when_nothing_fits() {
        let l = list(&[(0, 0, 10, 10), (10, 0, 4, 40)]);
        assert_eq!(l.best_fit(11, 5), None);
        assert_eq!(FreeList::new().best_fit(1, 1), None);
    }

    #[test]
    fn best_fit_prefers_shorter_rect() {
        let l = list(&[(0, 0, 50, 50), (50, 20, 50, 30)]);
        assert_eq!(l.best_fit(10, 10), Some(1));
    }

    #[test]
    fn best_fit_equal_height_prefers_topmost() {
        let l = list(&[(0, 40, 20, 20), (20, 10, 20, 20), (40, 30, 20, 20)]);
        assert_eq!(l.best_fit(10, 10), Some(1));
    }

    #[test]
    fn best_fit_smaller_and_higher_wins_over_shorter_first() {
        // Second is taller but both smaller and higher than the first candidate.
        let l = list(&[(0, 50, 100, 20), (0, 0, 10, 30)]);
        assert_eq!(l.best_fit(10, 10), Some(1));
    }

    #[test]
    fn best_fit_taller_and_lower_loses() {
        let l = list(&[(0, 0, 100, 20), (0, 20, 10, 30)]);
        assert_eq!(l.best_fit(10, 10), Some(0));
    }

    #[test]
    fn subdivide_snug_fit() {
        let mut l = list(&[(0, 0, 64, 64)]);
        l.subdivide(0, 16, 40, &mut Palette::default());
        assert_eq!(
            plain(&l),
            vec![Rect::new(16, 0, 48, 64), Rect::new(0, 40, 16, 24)]
        );
    }

    #[test]
    fn subdivide_snug_fit_exact_height_has_no_bottom() {
        let mut l = list(&[(0, 0, 64, 32)]);
        l.subdivide(0, 16, 32, &mut Palette::default());
        assert_eq!(plain(&l), vec![Rect::new(16, 0, 48, 32)]);
    }

    #[test]
    fn subdivide_tall_leftover() {
        let mut l = list(&[(8, 8, 64, 64)]);
        l.subdivide(0, 16, 16, &mut Palette::default());
        assert_eq!(
            plain(&l),
            vec![Rect::new(24, 8, 48, 16), Rect::new(8, 24, 64, 48)]
        );
    }

    #[test]
    fn subdivide_drops_empty_children_and_keeps_order() {
        let mut l = list(&[(0, 0, 5, 5), (0, 10, 16, 16), (30, 30, 5, 5)]);
        l.subdivide(1, 16, 16, &mut Palette::default());
        assert_eq!(
            plain(&l),
            vec![Rect::new(0, 0, 5, 5), Rect::new(30, 30, 5, 5)]
        );
    }

    #[test]
    fn overlapping_pairs_detects_overlap() {
        let l = list(&[(0, 0, 10, 10), (10, 0, 10, 10), (5, 5, 10, 10)]);
        assert_eq!(l.overlapping_pairs(), vec![(0, 2), (1, 2)]);
    }
}
