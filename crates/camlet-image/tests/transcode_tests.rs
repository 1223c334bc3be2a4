use camlet_image::{CaptureBuffer, FrameFormat, PixelFormat, image_size, transcode};

fn format(width: u32, height: u32, pixel_format: PixelFormat) -> FrameFormat {
    FrameFormat::with_fps(width, height, pixel_format, 30).unwrap()
}

#[test]
fn test_rgb24_rows_are_reversed() {
    // 2x3 RGB24: 6 bytes of pixels padded to an 8 byte stride
    let fmt = format(2, 3, PixelFormat::Rgb24);
    let src: Vec<u8> = (0..24).collect();
    let mut buffer = CaptureBuffer::new();

    transcode(&fmt, &src, true, &mut buffer);

    assert_eq!(buffer.len(), 24);
    assert_eq!(buffer.stride(), 8);
    assert_eq!(buffer.pixel_format(), Some(PixelFormat::Rgb24));
    // the last source row (top of the picture) comes first
    assert_eq!(&buffer.as_bytes()[0..8], &src[16..24]);
    assert_eq!(&buffer.as_bytes()[8..16], &src[8..16]);
    assert_eq!(&buffer.as_bytes()[16..24], &src[0..8]);
}

#[test]
fn test_rgb32_flip_ignores_transcode_flag() {
    let fmt = format(1, 2, PixelFormat::Rgb32);
    let src = [1, 2, 3, 4, 5, 6, 7, 8];
    let mut with_flag = CaptureBuffer::new();
    let mut without_flag = CaptureBuffer::new();

    transcode(&fmt, &src, true, &mut with_flag);
    transcode(&fmt, &src, false, &mut without_flag);

    assert_eq!(with_flag.as_bytes(), &[5, 6, 7, 8, 1, 2, 3, 4]);
    assert_eq!(with_flag.as_bytes(), without_flag.as_bytes());
}

#[test]
fn test_top_down_rgb_keeps_row_order() {
    let fmt = format(2, 3, PixelFormat::Rgb24).with_top_down(true);
    let src: Vec<u8> = (0..24).collect();
    let mut buffer = CaptureBuffer::new();

    transcode(&fmt, &src, true, &mut buffer);

    assert_eq!(buffer.as_bytes(), &src[..]);
}

#[test]
fn test_short_top_down_frame_zero_fills_the_bottom() {
    let fmt = format(1, 2, PixelFormat::Rgb32).with_top_down(true);
    let mut buffer = CaptureBuffer::new();

    transcode(&fmt, &[1, 2, 3, 4], true, &mut buffer);

    assert_eq!(buffer.as_bytes(), &[1, 2, 3, 4, 0, 0, 0, 0]);
}

#[test]
fn test_oversized_frame_is_clamped_to_image_size() {
    let fmt = format(2, 3, PixelFormat::Rgb24);
    let src: Vec<u8> = (0..40).collect();
    let mut buffer = CaptureBuffer::new();

    transcode(&fmt, &src, true, &mut buffer);

    assert_eq!(buffer.len(), 24);
    assert_eq!(buffer.capacity(), 24);
    assert_eq!(&buffer.as_bytes()[0..8], &src[16..24]);
}

#[test]
fn test_short_frame_zero_fills_missing_rows() {
    let fmt = format(2, 3, PixelFormat::Rgb24);
    let src: Vec<u8> = (1..=10).collect();
    let mut buffer = CaptureBuffer::new();

    transcode(&fmt, &src, true, &mut buffer);

    let out = buffer.as_bytes();
    assert_eq!(out.len(), 24);
    // top row would come from bytes 16..24, which never arrived
    assert_eq!(&out[0..8], &[0; 8]);
    assert_eq!(&out[8..16], &[9, 10, 0, 0, 0, 0, 0, 0]);
    assert_eq!(&out[16..24], &src[0..8]);
}

#[test]
fn test_yuyv_macro_pixel_fixture() {
    // Y=100 U=90 V=200 -> R=200 G=62 B=32 with the fixed-point BT.601 coefficients
    let fmt = format(2, 1, PixelFormat::Yuyv);
    let mut buffer = CaptureBuffer::new();

    transcode(&fmt, &[100, 90, 100, 200], true, &mut buffer);

    assert_eq!(buffer.pixel_format(), Some(PixelFormat::Rgb24));
    assert_eq!(buffer.stride(), 8);
    assert_eq!(buffer.as_bytes(), &[32, 62, 200, 32, 62, 200, 0, 0]);
}

#[test]
fn test_uyvy_matches_yuyv() {
    let mut yuyv = CaptureBuffer::new();
    let mut uyvy = CaptureBuffer::new();

    transcode(&format(2, 1, PixelFormat::Yuyv), &[100, 90, 100, 200], true, &mut yuyv);
    transcode(&format(2, 1, PixelFormat::Uyvy), &[90, 100, 200, 100], true, &mut uyvy);

    assert_eq!(yuyv.as_bytes(), uyvy.as_bytes());
}

#[test]
fn test_yuyv_rows_keep_their_order() {
    // row 0 black, row 1 white: no flip for YUV sources
    let fmt = format(2, 2, PixelFormat::Yuyv);
    let src = [0, 128, 0, 128, 255, 128, 255, 128];
    let mut buffer = CaptureBuffer::new();

    transcode(&fmt, &src, true, &mut buffer);

    let out = buffer.as_bytes();
    assert_eq!(&out[0..6], &[0; 6]);
    assert_eq!(&out[8..14], &[255; 6]);
}

#[test]
fn test_yuyv_without_transcode_is_copied_verbatim() {
    let fmt = format(2, 1, PixelFormat::Yuyv);
    let src = [100, 90, 100, 200];
    let mut buffer = CaptureBuffer::new();

    transcode(&fmt, &src, false, &mut buffer);

    assert_eq!(buffer.pixel_format(), Some(PixelFormat::Yuyv));
    assert_eq!(buffer.as_bytes(), &src);
}

#[test]
fn test_compressed_frame_is_copied_whole() {
    let fmt = format(640, 480, PixelFormat::Jpeg);
    let src = [0xFF, 0xD8, 0xFF, 0xE0, 0x00];
    let mut buffer = CaptureBuffer::new();

    transcode(&fmt, &src, true, &mut buffer);

    assert_eq!(buffer.as_bytes(), &src);
    assert_eq!(buffer.stride(), 0);
    assert_eq!(buffer.pixel_format(), Some(PixelFormat::Jpeg));
}

#[test]
fn test_buffer_grows_but_never_shrinks() {
    let mut buffer = CaptureBuffer::new();

    transcode(&format(4, 4, PixelFormat::Rgb32), &[7; 64], true, &mut buffer);
    assert_eq!(buffer.capacity(), 64);

    transcode(&format(2, 2, PixelFormat::Rgb32), &[9; 16], true, &mut buffer);
    assert_eq!(buffer.len(), 16);
    assert_eq!(buffer.capacity(), 64);
    assert_eq!(buffer.as_bytes(), &[9; 16]);
}

#[test]
fn test_preallocated_buffer_is_reused() {
    let fmt = format(640, 480, PixelFormat::Yuyv);
    let size = image_size(&fmt, true).unwrap();
    let mut buffer = CaptureBuffer::with_capacity(size);

    transcode(&fmt, &vec![128; 640 * 480 * 2], true, &mut buffer);

    assert_eq!(buffer.len(), size);
    assert_eq!(buffer.capacity(), size);
}

#[test]
fn test_image_size_by_encoding() {
    assert_eq!(image_size(&format(640, 480, PixelFormat::Yuyv), true), Some(921_600));
    assert_eq!(image_size(&format(640, 480, PixelFormat::Yuyv), false), Some(614_400));
    assert_eq!(image_size(&format(3, 2, PixelFormat::Rgb24), true), Some(24));
    assert_eq!(image_size(&format(640, 480, PixelFormat::Jpeg), true), None);
}
