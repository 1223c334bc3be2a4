use camlet_image::FrameFormat;

/// Configuration for opening a capture session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    identity: u32,
    format: FrameFormat,
    transcode_yuv: bool,
    preview_rate_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            identity: 0,
            format: FrameFormat::default(),
            transcode_yuv: true,
            preview_rate_ms: 15,
        }
    }
}

impl SessionConfig {
    /// Set the driver index to connect to.
    pub fn with_identity(mut self, identity: u32) -> Self {
        self.identity = identity;
        self
    }

    /// Set the format to request. The driver may settle on another one.
    pub fn with_format(mut self, format: FrameFormat) -> Self {
        self.format = format;
        self
    }

    /// Convert packed YUV frames to RGB when capturing.
    pub fn with_transcode_yuv(mut self, transcode_yuv: bool) -> Self {
        self.transcode_yuv = transcode_yuv;
        self
    }

    /// Set the preview pump interval in milliseconds.
    pub fn with_preview_rate_ms(mut self, preview_rate_ms: u32) -> Self {
        self.preview_rate_ms = preview_rate_ms;
        self
    }

    // Getters
    pub fn identity(&self) -> u32 {
        self.identity
    }

    pub fn format(&self) -> &FrameFormat {
        &self.format
    }

    pub fn transcode_yuv(&self) -> bool {
        self.transcode_yuv
    }

    pub fn preview_rate_ms(&self) -> u32 {
        self.preview_rate_ms
    }
}
