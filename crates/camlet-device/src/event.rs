use crate::driver::VideoHeader;
use std::time::Duration;

/// One delivered frame, borrowed from driver memory.
///
/// Only valid inside the frame handler it was passed to; copy the bytes out
/// (e.g. with a `Transcoder`) to keep them.
#[derive(Debug, Clone, Copy)]
pub struct FrameEvent<'a> {
    data: &'a [u8],
    timestamp: Duration,
}

impl<'a> FrameEvent<'a> {
    pub fn new(data: &'a [u8], timestamp: Duration) -> Self {
        Self { data, timestamp }
    }

    /// Package a native header.
    ///
    /// Returns `None` for a null data pointer with a non-zero length.
    ///
    /// # Safety
    ///
    /// A non-null `header.data` must point to `header.bytes_used` readable
    /// bytes that stay valid for `'a`.
    pub unsafe fn from_header(header: &'a VideoHeader) -> Option<Self> {
        let timestamp = Duration::from_millis(header.time_captured as u64);
        if header.bytes_used == 0 {
            return Some(Self::new(&[], timestamp));
        }
        if header.data.is_null() {
            return None;
        }
        let data = unsafe { std::slice::from_raw_parts(header.data, header.bytes_used as usize) };
        Some(Self::new(data, timestamp))
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Capture time relative to the start of the preview.
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }
}
