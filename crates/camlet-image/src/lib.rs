//! Frame formats and pixel normalization for camlet.
//!
//! Describes capture formats the way VFW-style drivers negotiate them
//! (`BITMAPINFOHEADER`), and turns raw captured frames into top-down pixel
//! buffers, converting packed YUV to RGB on request.

pub mod bitmap;
pub mod buffer;
pub mod error;
pub mod format;
pub mod transcode;

pub use bitmap::{BITMAP_INFO_HEADER_SIZE, BitmapInfoHeader};
pub use buffer::{CaptureBuffer, RgbFrame};
pub use error::ImageError;
pub use format::{FrameFormat, PixelFormat, fourcc_to_string};
pub use transcode::{image_size, stride, transcode};
