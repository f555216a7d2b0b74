use image::{Rgba, RgbaImage};
use tracing::{instrument, warn};

use crate::frame::{FrameSet, FrameSource};
use crate::model::{Rect, SheetLayout};

/// Copies `src` into `canvas` with its top-left corner at (dx, dy).
///
/// Pixels are replaced, not blended. The caller keeps the frame inside the
/// canvas.
pub fn blit_frame<F: FrameSource + ?Sized>(src: &F, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    for y in 0..src.height() {
        for x in 0..src.width() {
            canvas.put_pixel(dx + x, dy + y, src.pixel(x, y));
        }
    }
}

/// Fills `rect` with a solid color, cut down to the canvas.
pub fn fill_rect(canvas: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    let (cw, ch) = canvas.dimensions();
    let x_end = rect.right_edge().min(cw);
    let y_end = rect.bottom_edge().min(ch);
    for y in rect.y..y_end {
        for x in rect.x..x_end {
            canvas.put_pixel(x, y, color);
        }
    }
}

/// Renders the sheet described by `layout`.
///
/// The canvas has the layout's tight size. Every placed sprite is copied from
/// its frame; sprites that would leave the canvas or whose frame is missing
/// are skipped with a warning. With `overlay` set, the leftover free
/// rectangles are then painted in their debug colors. Free rectangles were
/// cut against the larger working canvas, so ones that stick out are clamped
/// (and logged) and ones starting outside are dropped.
#[instrument(skip_all, fields(width = layout.size.width, height = layout.size.height))]
pub fn compose_sheet<F: FrameSource>(
    layout: &SheetLayout,
    frames: &FrameSet<F>,
    overlay: bool,
) -> RgbaImage {
    let (width, height) = (layout.size.width, layout.size.height);
    let mut canvas = RgbaImage::new(width, height);
    let bounds = Rect::new(0, 0, width, height);

    for sprite in &layout.sprites {
        let Some(rect) = sprite.rect() else {
            warn!(id = sprite.id, w = sprite.width, h = sprite.height, "unplaced sprite left out of sheet");
            continue;
        };
        if !bounds.contains(&rect) {
            warn!(id = sprite.id, ?rect, width, height, "sprite outside sheet bounds");
            continue;
        }
        let Some(frame) = frames.get(sprite.id) else {
            warn!(id = sprite.id, "no frame for sprite");
            continue;
        };
        blit_frame(frame, &mut canvas, rect.x, rect.y);
    }

    if overlay {
        for (i, fr) in layout.free_rects.iter().enumerate() {
            let rect = fr.rect;
            if !bounds.contains(&rect) {
                warn!(rect = i, ?rect, width, height, "free rect extends past sheet bounds");
                if rect.x >= width || rect.y >= height {
                    continue;
                }
            }
            fill_rect(&mut canvas, rect, Rgba(fr.color));
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FreeRect, PackStats, SheetSize, Sprite};

    fn layout(size: SheetSize, sprites: Vec<Sprite>, free_rects: Vec<FreeRect>) -> SheetLayout {
        let stats = PackStats::collect(&sprites, size, 0, free_rects.len());
        SheetLayout {
            size,
            estimate: size.width.max(size.height),
            canvas: size,
            sprites,
            free_rects,
            unplaced: Vec::new(),
            stats,
        }
    }

    #[test]
    fn fill_rect_is_clamped() {
        let mut canvas = RgbaImage::new(4, 4);
        fill_rect(&mut canvas, Rect::new(2, 2, 10, 10), Rgba([9, 9, 9, 255]));
        assert_eq!(canvas.get_pixel(3, 3).0, [9, 9, 9, 255]);
        assert_eq!(canvas.get_pixel(1, 1).0, [0, 0, 0, 0]);
    }

    #[test]
    fn out_of_bounds_sprite_is_skipped() {
        let frames: FrameSet<RgbaImage> = vec![
            RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])),
            RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255])),
        ]
        .into();
        let sprites = vec![
            Sprite {
                id: 0,
                width: 2,
                height: 2,
                position: Some((0, 0)),
            },
            Sprite {
                id: 1,
                width: 2,
                height: 2,
                position: Some((3, 0)),
            },
        ];
        let sheet = compose_sheet(&layout(SheetSize::new(4, 2), sprites, Vec::new()), &frames, false);
        assert_eq!(sheet.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(sheet.get_pixel(3, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn overlay_paints_free_rects_after_sprites() {
        let frames: FrameSet<RgbaImage> = vec![RgbaImage::from_pixel(2, 2, Rgba([1, 1, 1, 255]))].into();
        let sprites = vec![Sprite {
            id: 0,
            width: 2,
            height: 2,
            position: Some((0, 0)),
        }];
        let free = vec![
            FreeRect::new(Rect::new(2, 0, 10, 2), [7, 7, 7, 255]),
            FreeRect::new(Rect::new(8, 0, 2, 2), [5, 5, 5, 255]),
        ];
        let l = layout(SheetSize::new(4, 2), sprites, free);
        let plain = compose_sheet(&l, &frames, false);
        assert_eq!(plain.get_pixel(3, 1).0, [0, 0, 0, 0]);
        let painted = compose_sheet(&l, &frames, true);
        assert_eq!(painted.dimensions(), (4, 2));
        assert_eq!(painted.get_pixel(0, 0).0, [1, 1, 1, 255]);
        assert_eq!(painted.get_pixel(3, 1).0, [7, 7, 7, 255]);
    }
}
