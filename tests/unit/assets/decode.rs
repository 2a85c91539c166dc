use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = png_bytes(1, 1, [100, 50, 200, 128]);

    let decoded = decode_image(&buf).unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.height, 1);
    assert_eq!(
        decoded.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_reports_natural_size() {
    let decoded = decode_image(&png_bytes(7, 3, [1, 2, 3, 255])).unwrap();
    assert_eq!((decoded.width, decoded.height), (7, 3));
    assert_eq!(decoded.rgba8_premul.len(), 7 * 3 * 4);
}

#[test]
fn corrupt_bytes_are_a_decode_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, StackshotError::Decode(_)));
}

#[test]
fn missing_file_is_an_error_not_a_panic() {
    let err = decode_image_file(Path::new("/nonexistent/stackshot/missing.png")).unwrap_err();
    assert!(err.to_string().contains("missing.png"));
}

#[test]
fn from_premul_checks_length() {
    assert!(DecodedImage::from_premul_rgba8(2, 2, vec![0; 16]).is_ok());
    assert!(DecodedImage::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
}

#[test]
fn source_name_is_the_file_name() {
    assert_eq!(source_name_for(Path::new("/tmp/photos/beach.jpg")), "beach.jpg");
}
