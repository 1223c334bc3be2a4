use crate::{CaptureDriver, CaptureSession, DeviceError, SessionConfig};
use camlet_image::FrameFormat;

/// A capture device as reported by device enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceDescriptor {
    identity: u32,
    name: String,
    description: String,
    characteristics: FrameFormat,
}

impl DeviceDescriptor {
    pub fn new(
        identity: u32,
        name: impl Into<String>,
        description: impl Into<String>,
        characteristics: FrameFormat,
    ) -> Self {
        Self {
            identity,
            name: name.into(),
            description: description.into(),
            characteristics,
        }
    }

    pub fn identity(&self) -> u32 {
        self.identity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Driver version string or similar free-form text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The device's preferred format.
    pub fn characteristics(&self) -> &FrameFormat {
        &self.characteristics
    }

    /// Open this device through `driver`, asking for `format`.
    pub fn open<D>(
        &self,
        driver: D,
        format: FrameFormat,
        transcode_yuv: bool,
    ) -> Result<CaptureSession, DeviceError>
    where
        D: CaptureDriver + 'static,
    {
        log::debug!("opening {} ({})", self.name, self.description);
        let config = SessionConfig::default()
            .with_identity(self.identity)
            .with_format(format)
            .with_transcode_yuv(transcode_yuv);
        CaptureSession::open(driver, &config)
    }
}

impl std::fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.identity, self.name)
    }
}
