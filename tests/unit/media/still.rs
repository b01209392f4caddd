use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let frame = Frame::solid(width, height, rgba);
    let img = frame.into_rgba_image().unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn infers_kind_from_extension() {
    assert_eq!(AssetKind::infer(Path::new("pupsik_face.mp4")), AssetKind::LoopingVideo);
    assert_eq!(AssetKind::infer(Path::new("a/B.MOV")), AssetKind::LoopingVideo);
    assert_eq!(AssetKind::infer(Path::new("images/big.png")), AssetKind::StillImage);
    assert_eq!(AssetKind::infer(Path::new("noext")), AssetKind::StillImage);
}

#[test]
fn decode_image_keeps_straight_alpha() {
    let frame = decode_image(&png_bytes(3, 2, [100, 50, 200, 128])).unwrap();
    assert_eq!((frame.width, frame.height), (3, 2));
    assert_eq!(&frame.data[..4], &[100, 50, 200, 128]);
}

#[test]
fn unreadable_image_is_asset_load_error() {
    let err = load_still_image(Path::new("/no/such/image.png")).unwrap_err();
    assert!(matches!(err, TalkheadError::AssetLoad(_)));
    assert!(decode_image(b"not an image").is_err());
}
