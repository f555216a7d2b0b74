use image::{DynamicImage, Rgba, RgbaImage};

/// Read access to a decoded bitmap.
///
/// The packer never mutates frames; it only needs their size and a way to
/// read individual pixels when compositing and verifying.
pub trait FrameSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Pixel at (x, y). Callers stay within `width() x height()`.
    fn pixel(&self, x: u32, y: u32) -> Rgba<u8>;
}

impl FrameSource for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }
    fn height(&self) -> u32 {
        self.dimensions().1
    }
    fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.get_pixel(x, y)
    }
}

impl<F: FrameSource + ?Sized> FrameSource for &F {
    fn width(&self) -> u32 {
        (**self).width()
    }
    fn height(&self) -> u32 {
        (**self).height()
    }
    fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        (**self).pixel(x, y)
    }
}

/// In-memory frame to pack (key + RGBA pixels).
#[derive(Debug, Clone)]
pub struct InputFrame {
    pub key: String,
    pub image: RgbaImage,
}

impl InputFrame {
    pub fn new(key: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            key: key.into(),
            image,
        }
    }

    pub fn from_dynamic(key: impl Into<String>, image: &DynamicImage) -> Self {
        Self::new(key, image.to_rgba8())
    }
}

impl FrameSource for InputFrame {
    fn width(&self) -> u32 {
        self.image.width()
    }
    fn height(&self) -> u32 {
        self.image.height()
    }
    fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }
}

/// Ordered collection of frames. A frame's index is its sprite id.
#[derive(Debug, Clone)]
pub struct FrameSet<F = InputFrame> {
    frames: Vec<F>,
}

impl<F> Default for FrameSet<F> {
    fn default() -> Self {
        Self { frames: Vec::new() }
    }
}

impl<F: FrameSource> FrameSet<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a frame and returns its id.
    pub fn push(&mut self, frame: F) -> usize {
        self.frames.push(frame);
        self.frames.len() - 1
    }

    pub fn frames(&self) -> &[F] {
        &self.frames
    }

    pub fn get(&self, id: usize) -> Option<&F> {
        self.frames.get(id)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, F> {
        self.frames.iter()
    }

    /// Sum of all frame areas in pixels.
    pub fn total_area(&self) -> u64 {
        self.frames
            .iter()
            .map(|f| u64::from(f.width()) * u64::from(f.height()))
            .sum()
    }

    /// Frame sizes in input order.
    pub fn sizes(&self) -> Vec<(u32, u32)> {
        self.frames.iter().map(|f| (f.width(), f.height())).collect()
    }

    pub fn into_inner(self) -> Vec<F> {
        self.frames
    }
}

impl<F> From<Vec<F>> for FrameSet<F> {
    fn from(frames: Vec<F>) -> Self {
        Self { frames }
    }
}

impl<F> FromIterator<F> for FrameSet<F> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

impl<'a, F> IntoIterator for &'a FrameSet<F> {
    type Item = &'a F;
    type IntoIter = std::slice::Iter<'a, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
