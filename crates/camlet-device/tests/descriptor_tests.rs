mod common;

use camlet_device::{DeviceDescriptor, SessionConfig};
use camlet_image::{FrameFormat, PixelFormat};
use common::fake_driver;

#[test]
fn test_config_defaults() {
    let config = SessionConfig::default();

    assert_eq!(config.identity(), 0);
    assert_eq!(*config.format(), FrameFormat::with_fps(640, 480, PixelFormat::Yuyv, 30).unwrap());
    assert!(config.transcode_yuv());
    assert_eq!(config.preview_rate_ms(), 15);
}

#[test]
fn test_config_builder() {
    let format = FrameFormat::with_fps(1280, 720, PixelFormat::Jpeg, 15).unwrap();
    let config = SessionConfig::default()
        .with_identity(2)
        .with_format(format)
        .with_transcode_yuv(false)
        .with_preview_rate_ms(33);

    assert_eq!(config.identity(), 2);
    assert_eq!(*config.format(), format);
    assert!(!config.transcode_yuv());
    assert_eq!(config.preview_rate_ms(), 33);
}

#[test]
fn test_descriptor_opens_with_its_identity() {
    let preferred = FrameFormat::with_fps(320, 240, PixelFormat::Rgb24, 30).unwrap();
    let descriptor = DeviceDescriptor::new(1, "USB Camera", "Version 1.0", preferred);
    let (driver, handle) = fake_driver();

    let session = descriptor.open(driver, *descriptor.characteristics(), false).unwrap();

    assert_eq!(session.identity(), 1);
    assert_eq!(*session.characteristics(), preferred);
    assert!(!session.transcoder().transcode_yuv());
    assert_eq!(handle.identity(), Some(1));
    assert_eq!(descriptor.to_string(), "1: USB Camera");
    assert_eq!(descriptor.description(), "Version 1.0");
}
