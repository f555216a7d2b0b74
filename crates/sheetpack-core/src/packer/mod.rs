pub mod free_list;
pub mod grow;
pub mod merge;

pub use free_list::FreeList;
pub use grow::GrowDirection;

/// Source of fill colors for the debug overlay.
///
/// Every free rectangle created during placement takes the next color.
/// Implementations must not assume anything about how many colors are drawn;
/// colors never influence where frames end up.
pub trait DebugColors {
    fn next_color(&mut self) -> [u8; 4];
}

impl<F: FnMut() -> [u8; 4]> DebugColors for F {
    fn next_color(&mut self) -> [u8; 4] {
        self()
    }
}

/// Deterministic cycling palette, the default overlay color source.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    next: usize,
}

const PALETTE: [[u8; 4]; 8] = [
    [230, 25, 75, 255],
    [60, 180, 75, 255],
    [255, 225, 25, 255],
    [0, 130, 200, 255],
    [245, 130, 48, 255],
    [145, 30, 180, 255],
    [70, 240, 240, 255],
    [240, 50, 230, 255],
];

impl DebugColors for Palette {
    fn next_color(&mut self) -> [u8; 4] {
        let c = PALETTE[self.next % PALETTE.len()];
        self.next = self.next.wrapping_add(1);
        c
    }
}
