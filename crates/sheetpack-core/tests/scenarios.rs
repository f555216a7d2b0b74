use image::{Rgba, RgbaImage};
use sheetpack_core::error::SheetPackError;
use sheetpack_core::prelude::*;
use sheetpack_core::{check_overlaps, check_pixmap};

fn solid(w: u32, h: u32, seed: u8) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        Rgba([seed, (x % 251) as u8, (y % 251) as u8, 255])
    })
}

fn frames(sizes: &[(u32, u32)]) -> FrameSet<RgbaImage> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| solid(w, h, i as u8))
        .collect()
}

#[test]
fn single_frame_sheet_is_trimmed_to_the_frame() {
    let set = frames(&[(16, 16)]);
    let out = pack(&set, true).expect("pack");
    assert_eq!(out.layout.estimate, 32);
    assert_eq!(out.layout.size, SheetSize::new(16, 16));
    assert_eq!(out.sheet.dimensions(), (16, 16));
    assert_eq!(out.sprites()[0].position, Some((0, 0)));
    check_pixmap(&out.sheet, out.sprites(), &set).expect("pixels");
}

#[test]
fn four_squares_fill_a_64_sheet() {
    let set = frames(&[(32, 32); 4]);
    for sort in [true, false] {
        let out = pack(&set, sort).expect("pack");
        assert!(out.layout.unplaced.is_empty());
        assert!(out.layout.size.width <= 64 && out.layout.size.height <= 64);
        let positions: Vec<_> = out.sprites().iter().map(|s| s.position).collect();
        assert_eq!(
            positions,
            vec![Some((0, 0)), Some((32, 0)), Some((0, 32)), Some((32, 32))]
        );
        check_overlaps(out.sprites()).expect("overlaps");
    }
}

#[test]
fn wide_frame_grows_the_sheet() {
    let set = frames(&[(500, 4)]);
    let out = pack(&set, true).expect("pack");
    assert_eq!(out.layout.estimate, 64);
    assert_eq!(out.stats().growths, 1);
    assert_eq!(out.layout.canvas, SheetSize::new(500, 64));
    assert_eq!(out.layout.size, SheetSize::new(500, 4));
    check_pixmap(&out.sheet, out.sprites(), &set).expect("pixels");
}

#[test]
fn growth_in_both_directions() {
    let set = frames(&[(500, 1), (1, 500)]);
    let out = pack(&set, true).expect("pack");
    assert_eq!(out.layout.estimate, 48);
    assert_eq!(out.stats().growths, 2);
    assert_eq!(out.sprites()[0].position, Some((1, 0)));
    assert_eq!(out.sprites()[1].position, Some((0, 0)));
    assert!(out.layout.size.width >= 500 && out.layout.size.height >= 500);
    assert_eq!(out.layout.size, SheetSize::new(501, 500));
    check_overlaps(out.sprites()).expect("overlaps");
}

#[test]
fn oversized_input_fails_before_placement() {
    let sizes = vec![(4096, 4096)];
    let err = pack_layout(&sizes, &PackerConfig::default()).unwrap_err();
    match err {
        SheetPackError::SheetTooLarge { estimate, max } => {
            assert_eq!(estimate, 4368);
            assert_eq!(max, 4096);
        }
        other => panic!("expected SheetTooLarge, got {other:?}"),
    }

    let cfg = PackerConfig::builder().max_sheet_size(16).build();
    assert!(matches!(
        pack_frames(&frames(&[(16, 16)]), &cfg),
        Err(SheetPackError::SheetTooLarge { estimate: 32, max: 16 })
    ));
}

#[test]
fn unplaceable_frame_is_reported_not_fatal() {
    let set = frames(&[(4, 36), (40, 40), (44, 48)]);
    let out = pack(&set, false).expect("pack");
    assert_eq!(out.layout.unplaced, vec![2]);
    assert_eq!(out.stats().unplaced, 1);
    assert_eq!(out.sprites()[2].position, None);
    assert_eq!(out.layout.size, SheetSize::new(40, 76));

    let placed: Vec<Sprite> = out.sprites().iter().filter(|s| s.is_placed()).copied().collect();
    check_pixmap(&out.sheet, &placed, &set).expect("placed pixels");
    assert!(check_pixmap(&out.sheet, out.sprites(), &set).is_err());

    let sorted = pack(&set, true).expect("pack sorted");
    assert!(sorted.layout.unplaced.is_empty());
    assert_eq!(sorted.layout.size, SheetSize::new(84, 76));
}
