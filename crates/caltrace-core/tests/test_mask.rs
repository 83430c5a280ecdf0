use std::io::Cursor;

use tiff::encoder::{colortype, TiffEncoder};

use caltrace_core::error::CaltraceError;
use caltrace_core::mask::load_mask;

fn gray_png(w: u32, h: u32, pixels: &[u8]) -> Vec<u8> {
    let img = image::GrayImage::from_raw(w, h, pixels.to_vec()).unwrap();
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn gray16_tiff(w: u32, h: u32, pixels: &[u16]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut cursor).unwrap();
        encoder
            .write_image::<colortype::Gray16>(w, h, pixels)
            .unwrap();
    }
    cursor.into_inner()
}

#[test]
fn test_load_png_mask_labels_are_raw() {
    // labels 0 (background), 1, and 5; values must not be rescaled
    let bytes = gray_png(3, 2, &[0, 1, 5, 0, 1, 0]);
    let data = load_mask(&bytes).unwrap();

    assert_eq!(data.mask.cell_ids, vec![1, 5]);
    assert_eq!(data.mask.cell_count(), 2);
    assert_eq!((data.mask.height(), data.mask.width()), (2, 3));
    assert_eq!(data.mask.labels[[0, 0]], 0);
    assert_eq!(data.mask.labels[[0, 1]], 1);
    assert_eq!(data.mask.labels[[0, 2]], 5);
    assert_eq!(data.mask.labels[[1, 1]], 1);
}

#[test]
fn test_load_tiff_mask_16bit_labels() {
    // label values above u8 range survive verbatim
    let bytes = gray16_tiff(2, 2, &[0, 300, 300, 4500]);
    let data = load_mask(&bytes).unwrap();
    assert_eq!(data.mask.cell_ids, vec![300, 4500]);
    assert_eq!(data.mask.labels[[0, 1]], 300);
}

#[test]
fn test_disjoint_regions_sharing_a_label_are_one_cell() {
    // label 1 in two opposite corners
    let bytes = gray_png(3, 3, &[1, 0, 0, 0, 0, 0, 0, 0, 1]);
    let data = load_mask(&bytes).unwrap();
    assert_eq!(data.mask.cell_ids, vec![1]);
}

#[test]
fn test_all_zero_mask_is_valid_and_empty() {
    let bytes = gray_png(4, 4, &[0; 16]);
    let data = load_mask(&bytes).unwrap();
    assert_eq!(data.mask.cell_count(), 0);
    assert!(data.mask.cell_ids.is_empty());
}

#[test]
fn test_mask_preview_is_png() {
    let bytes = gray_png(3, 2, &[0, 1, 2, 0, 1, 0]);
    let data = load_mask(&bytes).unwrap();
    assert_eq!(&data.preview[0..4], b"\x89PNG");
}

#[test]
fn test_empty_mask_input() {
    assert!(matches!(load_mask(&[]), Err(CaltraceError::Mask(_))));
}

#[test]
fn test_unreadable_mask_input() {
    assert!(matches!(
        load_mask(b"not an image at all"),
        Err(CaltraceError::Mask(_))
    ));
}
