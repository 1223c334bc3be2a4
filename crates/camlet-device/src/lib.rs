//! Webcam capture over callback-driven native capture drivers.
//!
//! A [`CaptureSession`] connects a [`CaptureDriver`] to a device, negotiates
//! a frame format, and re-emits the driver's frame callbacks to a single
//! subscriber. Frames can be copied out synchronously with a [`Transcoder`]
//! or received asynchronously through [`CaptureSession::frames`].

pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod event;
pub mod session;
pub mod stream;
pub mod transcoder;

#[cfg(all(windows, feature = "vfw"))]
pub mod vfw;

pub use config::SessionConfig;
pub use descriptor::DeviceDescriptor;
pub use dispatch::FrameHandler;
pub use driver::{CaptureDriver, CaptureParameters, FrameThunk, VideoHeader};
pub use error::DeviceError;
pub use event::FrameEvent;
pub use session::CaptureSession;
pub use stream::{Camera, CapturedFrame, FrameReceiver};
pub use transcoder::Transcoder;

#[cfg(all(windows, feature = "vfw"))]
pub use vfw::{VfwDriver, pump_messages};
