use crate::DeviceError;
use camlet_image::BitmapInfoHeader;
use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;

/// The capture sequence parameters a driver keeps per device.
///
/// Only the frame interval is interpreted; everything else is carried back
/// to the driver unchanged.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureParameters {
    pub micro_seconds_per_frame: u32,
    reserved: [u32; 23],
}

/// The part of a native video header a frame callback needs.
#[derive(Debug, Clone, Copy)]
pub struct VideoHeader {
    pub data: *const u8,
    pub bytes_used: u32,
    /// Milliseconds since capture started.
    pub time_captured: u32,
}

/// A registration token handed to the driver for frame delivery.
///
/// Pairs an opaque context pointer with the function that knows how to use
/// it. The driver stores it and calls `invoke` once per frame.
#[derive(Clone, Copy)]
pub struct FrameThunk {
    context: NonNull<c_void>,
    entry: unsafe fn(NonNull<c_void>, &VideoHeader),
}

// The context is only ever read through `&`, and its target is Sync.
unsafe impl Send for FrameThunk {}
unsafe impl Sync for FrameThunk {}

impl FrameThunk {
    pub(crate) fn new(
        context: NonNull<c_void>,
        entry: unsafe fn(NonNull<c_void>, &VideoHeader),
    ) -> Self {
        Self { context, entry }
    }

    /// Deliver one frame.
    ///
    /// # Safety
    ///
    /// The thunk must still be registered with the driver that received it
    /// (the context is released once the driver is destroyed), and
    /// `header.data` must point to `header.bytes_used` readable bytes for the
    /// duration of the call.
    pub unsafe fn invoke(&self, header: &VideoHeader) {
        unsafe { (self.entry)(self.context, header) }
    }
}

impl fmt::Debug for FrameThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameThunk")
            .field("context", &self.context)
            .finish()
    }
}

/// The native capture subsystem, one instance per capture window.
///
/// Every call is a request: drivers are free to ignore parameter and format
/// writes, so the session always reads values back.
///
/// Drivers need not be `Send`: native capture windows belong to the thread
/// that created them, so a session stays on that thread too.
pub trait CaptureDriver {
    /// Attach the driver to the device with the given identity.
    fn connect(&mut self, identity: u32) -> Result<(), DeviceError>;

    fn disconnect(&mut self) -> Result<(), DeviceError>;

    fn parameters(&mut self) -> Result<CaptureParameters, DeviceError>;

    fn set_parameters(&mut self, parameters: &CaptureParameters) -> Result<(), DeviceError>;

    fn set_video_format(&mut self, header: &BitmapInfoHeader) -> Result<(), DeviceError>;

    /// The raw format descriptor currently in effect. May be longer than a
    /// `BITMAPINFOHEADER` (palettes, bit masks).
    fn video_format(&mut self) -> Result<Vec<u8>, DeviceError>;

    /// Register a frame thunk, or unregister with `None`.
    fn set_frame_callback(&mut self, thunk: Option<FrameThunk>) -> Result<(), DeviceError>;

    fn set_preview_scale(&mut self, enabled: bool) -> Result<(), DeviceError>;

    fn set_preview_rate(&mut self, milliseconds: u32) -> Result<(), DeviceError>;

    /// Turn the preview pump, and with it frame delivery, on or off.
    fn set_preview(&mut self, enabled: bool) -> Result<(), DeviceError>;

    /// Release the native resources.
    ///
    /// On `Ok` no invocation of a registered thunk may still be running, and
    /// none may start afterwards. On `Err` the driver may still call the
    /// thunk, so its context has to stay alive.
    fn destroy(&mut self) -> Result<(), DeviceError>;
}

/// Frame interval in microseconds for a rate in frames per 1000 seconds.
pub fn micro_seconds_per_frame(frames_per_1000_second: u32) -> u32 {
    if frames_per_1000_second == 0 {
        return 0;
    }
    (1_000_000_000u64 / frames_per_1000_second as u64) as u32
}

/// Rate in frames per 1000 seconds for a frame interval in microseconds.
pub fn frames_per_1000_second(micro_seconds_per_frame: u32) -> u32 {
    if micro_seconds_per_frame == 0 {
        return 0;
    }
    (1_000_000_000u64 / micro_seconds_per_frame as u64) as u32
}
