use crate::event::FrameEvent;
use camlet_image::{CaptureBuffer, FrameFormat, image_size, transcode};

/// Copies delivered frames into caller buffers using a negotiated format.
///
/// Detached from the session so frame handlers can use it without touching
/// the session itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transcoder {
    format: FrameFormat,
    transcode_yuv: bool,
}

impl Transcoder {
    pub fn new(format: FrameFormat, transcode_yuv: bool) -> Self {
        Self {
            format,
            transcode_yuv,
        }
    }

    pub fn format(&self) -> &FrameFormat {
        &self.format
    }

    pub fn transcode_yuv(&self) -> bool {
        self.transcode_yuv
    }

    /// Bytes a captured image occupies, `None` for compressed encodings.
    pub fn image_size(&self) -> Option<usize> {
        image_size(&self.format, self.transcode_yuv)
    }

    /// A buffer large enough that capturing never reallocates.
    pub fn buffer(&self) -> CaptureBuffer {
        match self.image_size() {
            Some(size) => CaptureBuffer::with_capacity(size),
            None => CaptureBuffer::new(),
        }
    }

    pub fn capture(&self, event: &FrameEvent<'_>, buffer: &mut CaptureBuffer) {
        transcode(&self.format, event.data(), self.transcode_yuv, buffer);
    }
}
