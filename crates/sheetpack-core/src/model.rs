use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right_edge(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom_edge(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
    /// Half-open overlap test on both axes.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right_edge()
            && other.x < self.right_edge()
            && self.y < other.bottom_edge()
            && other.y < self.bottom_edge()
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x
            && r.y >= self.y
            && r.right_edge() <= self.right_edge()
            && r.bottom_edge() <= self.bottom_edge()
    }
}

/// An unoccupied region of the sheet canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FreeRect {
    pub rect: Rect,
    /// Fill used by the debug overlay; never consulted for placement.
    pub color: [u8; 4],
}

impl FreeRect {
    pub fn new(rect: Rect, color: [u8; 4]) -> Self {
        Self { rect, color }
    }
}

/// Canvas dimensions. Only ever grows while sprites are being placed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SheetSize {
    pub width: u32,
    pub height: u32,
}

impl SheetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
    pub fn square(side: u32) -> Self {
        Self::new(side, side)
    }
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Placement record of one frame.
///
/// `id` is the frame's index in the input set and survives any reordering
/// done during placement. `position` stays `None` for frames that could not
/// be placed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sprite {
    pub id: usize,
    pub width: u32,
    pub height: u32,
    pub position: Option<(u32, u32)>,
}

impl Sprite {
    pub fn unplaced(id: usize, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            position: None,
        }
    }
    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }
    /// Occupied rectangle on the sheet, if placed.
    pub fn rect(&self) -> Option<Rect> {
        self.position
            .map(|(x, y)| Rect::new(x, y, self.width, self.height))
    }
}

/// Statistics about one packing pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PackStats {
    /// Number of input frames.
    pub frames: usize,
    /// Frames that received a position.
    pub placed: usize,
    /// Frames left without a position.
    pub unplaced: usize,
    /// Successful canvas extensions.
    pub growths: usize,
    /// Area of the final (tight) sheet.
    pub sheet_area: u64,
    /// Sum of placed sprite areas.
    pub used_area: u64,
    /// used_area / sheet_area (0.0 to 1.0).
    pub occupancy: f64,
    /// Free rectangles left when placement finished.
    pub free_rects: usize,
}

impl PackStats {
    pub(crate) fn collect(
        sprites: &[Sprite],
        size: SheetSize,
        growths: usize,
        free_rects: usize,
    ) -> Self {
        let placed = sprites.iter().filter(|s| s.is_placed()).count();
        let used_area: u64 = sprites.iter().filter_map(Sprite::rect).map(|r| r.area()).sum();
        let sheet_area = size.area();
        let occupancy = if sheet_area > 0 {
            used_area as f64 / sheet_area as f64
        } else {
            0.0
        };
        Self {
            frames: sprites.len(),
            placed,
            unplaced: sprites.len() - placed,
            growths,
            sheet_area,
            used_area,
            occupancy,
            free_rects,
        }
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Frames: {}, Placed: {}, Unplaced: {}, Growths: {}, Occupancy: {:.2}%, Sheet Area: {} px², Used Area: {} px²",
            self.frames,
            self.placed,
            self.unplaced,
            self.growths,
            self.occupancy * 100.0,
            self.sheet_area,
            self.used_area,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.sheet_area.saturating_sub(self.used_area)
    }
}

/// Layout produced by the placement pass (no pixel data).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Tight bounding box of all placed sprites.
    pub size: SheetSize,
    /// Square size the free-list was seeded with.
    pub estimate: u32,
    /// Canvas size reached during placement, before trimming to `size`.
    pub canvas: SheetSize,
    /// One sprite per input frame, in input order.
    pub sprites: Vec<Sprite>,
    /// Free rectangles left after the last placement.
    pub free_rects: Vec<FreeRect>,
    /// Ids of frames that could not be placed.
    pub unplaced: Vec<usize>,
    pub stats: PackStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersects_is_half_open() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(&Rect::new(5, 5, 10, 10)));
        assert!(!a.intersects(&Rect::new(10, 0, 5, 5)));
        assert!(!a.intersects(&Rect::new(0, 10, 5, 5)));
    }

    #[test]
    fn contains_edges() {
        let outer = Rect::new(0, 0, 20, 20);
        assert!(outer.contains(&Rect::new(0, 0, 20, 20)));
        assert!(outer.contains(&Rect::new(5, 5, 5, 5)));
        assert!(!outer.contains(&Rect::new(15, 15, 10, 10)));
    }

    #[test]
    fn stats_ignore_unplaced_sprites() {
        let sprites = [
            Sprite {
                id: 0,
                width: 4,
                height: 4,
                position: Some((0, 0)),
            },
            Sprite::unplaced(1, 8, 8),
        ];
        let stats = PackStats::collect(&sprites, SheetSize::new(4, 8), 0, 2);
        assert_eq!(stats.placed, 1);
        assert_eq!(stats.unplaced, 1);
        assert_eq!(stats.used_area, 16);
        assert_eq!(stats.wasted_area(), 16);
        assert!((stats.occupancy - 0.5).abs() < f64::EPSILON);
    }
}
