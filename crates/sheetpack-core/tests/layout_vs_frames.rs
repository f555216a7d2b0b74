use image::{Rgba, RgbaImage};
use sheetpack_core::prelude::*;

#[test]
fn layout_and_frames_have_same_geometry() {
    let sizes = vec![(40, 20), (16, 32), (10, 10), (8, 48)];
    let layout = pack_layout(&sizes, &PackerConfig::default()).expect("layout");

    let set: FrameSet<InputFrame> = sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| InputFrame::new(format!("f{i}"), RgbaImage::new(w, h)))
        .collect();
    let out = pack_frames(&set, &PackerConfig::default()).expect("frames");

    assert_eq!(layout.sprites, out.layout.sprites);
    assert_eq!(layout.size, out.layout.size);
    assert_eq!(out.sheet.dimensions(), (layout.size.width, layout.size.height));
}

#[test]
fn overlay_paints_only_free_space() {
    let set: FrameSet<RgbaImage> = vec![
        RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255])),
        RgbaImage::from_pixel(16, 16, Rgba([40, 50, 60, 255])),
        RgbaImage::from_pixel(8, 24, Rgba([70, 80, 90, 255])),
    ]
    .into();
    let cfg = PackerConfig::builder().debug_overlay(true).verify(true).build();
    let mut gray = || -> [u8; 4] { [128, 128, 128, 255] };
    let out = pack_frames_with(&set, &cfg, &mut gray).expect("pack");

    let sheet = &out.sheet;
    let occupied: Vec<Rect> = out.sprites().iter().filter_map(Sprite::rect).collect();
    for (x, y, px) in sheet.enumerate_pixels() {
        let inside = occupied
            .iter()
            .any(|r| x >= r.x && x < r.right_edge() && y >= r.y && y < r.bottom_edge());
        if !inside && px.0 != [0, 0, 0, 0] {
            assert_eq!(px.0, [128, 128, 128, 255]);
        }
    }
    for sprite in out.sprites() {
        let (x, y) = sprite.position.expect("placed");
        let expected = set.get(sprite.id).expect("frame").get_pixel(0, 0);
        assert_eq!(sheet.get_pixel(x, y), expected);
    }
}

#[test]
fn overlay_clamps_rects_past_the_tight_sheet() {
    // The working canvas is 32x32 but the sheet is cut to 16x16, so the
    // leftover free space extends past the sheet.
    let set: FrameSet<RgbaImage> = vec![RgbaImage::from_pixel(16, 16, Rgba([1, 2, 3, 255]))].into();
    let cfg = PackerConfig::builder().debug_overlay(true).build();
    let out = pack_frames(&set, &cfg).expect("pack");
    assert_eq!(out.layout.canvas, SheetSize::square(32));
    assert!(!out.layout.free_rects.is_empty());
    assert!(
        out.layout
            .free_rects
            .iter()
            .all(|f| f.rect.right_edge() > 16 || f.rect.bottom_edge() > 16)
    );
    assert_eq!(out.sheet.dimensions(), (16, 16));
    assert!(out.sheet.pixels().all(|p| p.0 == [1, 2, 3, 255]));
}
