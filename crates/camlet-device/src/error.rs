use camlet_image::ImageError;
use std::fmt;

#[derive(Debug)]
pub enum DeviceError {
    /// The driver could not connect to the device.
    Open(String),
    /// No usable format could be negotiated.
    Format(String),
    /// A driver call failed after the session was opened.
    Driver(String),
    /// The session has been disposed.
    Closed,
    Channel(String),
    Image(ImageError),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Open(msg) => write!(f, "open error: {msg}"),
            DeviceError::Format(msg) => write!(f, "format error: {msg}"),
            DeviceError::Driver(msg) => write!(f, "driver error: {msg}"),
            DeviceError::Closed => write!(f, "capture session is closed"),
            DeviceError::Channel(msg) => write!(f, "channel error: {msg}"),
            DeviceError::Image(err) => write!(f, "image error: {err}"),
        }
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeviceError::Image(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ImageError> for DeviceError {
    fn from(err: ImageError) -> Self {
        DeviceError::Image(err)
    }
}

impl From<std::io::Error> for DeviceError {
    fn from(err: std::io::Error) -> Self {
        DeviceError::Driver(err.to_string())
    }
}
