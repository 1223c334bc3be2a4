//! Video for Windows backend.
//!
//! Drives an `avicap32` capture window with `WM_CAP_*` messages. Frame
//! callbacks are delivered on the thread that owns the window while it
//! processes messages, see [`pump_messages`].

use crate::DeviceError;
use crate::driver::{CaptureDriver, CaptureParameters, FrameThunk, VideoHeader};
use camlet_image::{BITMAP_INFO_HEADER_SIZE, BitmapInfoHeader};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    DestroyWindow, DispatchMessageW, MSG, PM_REMOVE, PeekMessageW, SendMessageW, TranslateMessage,
    WM_USER,
};

const WM_CAP_START: u32 = WM_USER;
const WM_CAP_SET_CALLBACK_FRAME: u32 = WM_CAP_START + 5;
const WM_CAP_GET_USER_DATA: u32 = WM_CAP_START + 8;
const WM_CAP_SET_USER_DATA: u32 = WM_CAP_START + 9;
const WM_CAP_DRIVER_CONNECT: u32 = WM_CAP_START + 10;
const WM_CAP_DRIVER_DISCONNECT: u32 = WM_CAP_START + 11;
const WM_CAP_GET_VIDEOFORMAT: u32 = WM_CAP_START + 44;
const WM_CAP_SET_VIDEOFORMAT: u32 = WM_CAP_START + 45;
const WM_CAP_SET_PREVIEW: u32 = WM_CAP_START + 50;
const WM_CAP_SET_PREVIEWRATE: u32 = WM_CAP_START + 52;
const WM_CAP_SET_SCALE: u32 = WM_CAP_START + 53;
const WM_CAP_SET_SEQUENCE_SETUP: u32 = WM_CAP_START + 64;
const WM_CAP_GET_SEQUENCE_SETUP: u32 = WM_CAP_START + 65;

// VIDEOHDR
#[repr(C)]
struct NativeVideoHeader {
    data: *mut u8,
    buffer_length: u32,
    bytes_used: u32,
    time_captured: u32,
    user: usize,
    flags: u32,
    reserved: [usize; 4],
}

#[link(name = "avicap32")]
unsafe extern "system" {
    fn capCreateCaptureWindowW(
        window_name: *const u16,
        style: u32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        parent: HWND,
        id: i32,
    ) -> HWND;
}

/// A capture window driving one VFW device.
///
/// Must be used from the thread that created it, which also has to pump
/// messages for frames to arrive. `HWND` is not `Send`, so neither is this.
pub struct VfwDriver {
    hwnd: HWND,
    thunk: Option<Box<FrameThunk>>,
}

impl std::fmt::Debug for VfwDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VfwDriver")
            .field("hwnd", &self.hwnd.0)
            .field("callback", &self.thunk.is_some())
            .finish()
    }
}

impl VfwDriver {
    /// Create a hidden capture window on the current thread.
    pub fn new() -> Result<Self, DeviceError> {
        let name: Vec<u16> = "camlet".encode_utf16().chain(Some(0)).collect();
        let hwnd =
            unsafe { capCreateCaptureWindowW(name.as_ptr(), 0, 0, 0, 0, 0, HWND::default(), 0) };
        if hwnd.is_invalid() {
            return Err(DeviceError::Open(
                "couldn't create capture window".to_string(),
            ));
        }
        log::debug!("created capture window {:?}", hwnd.0);
        Ok(Self { hwnd, thunk: None })
    }

    fn send(&self, msg: u32, wparam: usize, lparam: isize) -> isize {
        unsafe { SendMessageW(self.hwnd, msg, Some(WPARAM(wparam)), Some(LPARAM(lparam))) }.0
    }

    fn request(
        &self,
        what: &str,
        msg: u32,
        wparam: usize,
        lparam: isize,
    ) -> Result<(), DeviceError> {
        if self.hwnd.is_invalid() {
            return Err(DeviceError::Closed);
        }
        if self.send(msg, wparam, lparam) == 0 {
            return Err(DeviceError::Driver(format!("{what} failed")));
        }
        Ok(())
    }
}

impl CaptureDriver for VfwDriver {
    fn connect(&mut self, identity: u32) -> Result<(), DeviceError> {
        self.request("driver connect", WM_CAP_DRIVER_CONNECT, identity as usize, 0)
    }

    fn disconnect(&mut self) -> Result<(), DeviceError> {
        self.request("driver disconnect", WM_CAP_DRIVER_DISCONNECT, 0, 0)
    }

    fn parameters(&mut self) -> Result<CaptureParameters, DeviceError> {
        let mut parameters = CaptureParameters::default();
        self.request(
            "get sequence setup",
            WM_CAP_GET_SEQUENCE_SETUP,
            size_of::<CaptureParameters>(),
            &mut parameters as *mut CaptureParameters as isize,
        )?;
        Ok(parameters)
    }

    fn set_parameters(&mut self, parameters: &CaptureParameters) -> Result<(), DeviceError> {
        self.request(
            "set sequence setup",
            WM_CAP_SET_SEQUENCE_SETUP,
            size_of::<CaptureParameters>(),
            parameters as *const CaptureParameters as isize,
        )
    }

    fn set_video_format(&mut self, header: &BitmapInfoHeader) -> Result<(), DeviceError> {
        let bytes = header.to_bytes();
        self.request(
            "set video format",
            WM_CAP_SET_VIDEOFORMAT,
            BITMAP_INFO_HEADER_SIZE,
            bytes.as_ptr() as isize,
        )
    }

    fn video_format(&mut self) -> Result<Vec<u8>, DeviceError> {
        if self.hwnd.is_invalid() {
            return Err(DeviceError::Closed);
        }
        let size = self.send(WM_CAP_GET_VIDEOFORMAT, 0, 0);
        if size <= 0 {
            return Err(DeviceError::Driver("video format size unavailable".to_string()));
        }
        let mut descriptor = vec![0u8; size as usize];
        let written = self.send(
            WM_CAP_GET_VIDEOFORMAT,
            descriptor.len(),
            descriptor.as_mut_ptr() as isize,
        );
        if written <= 0 {
            return Err(DeviceError::Driver("get video format failed".to_string()));
        }
        descriptor.truncate(written as usize);
        Ok(descriptor)
    }

    fn set_frame_callback(&mut self, thunk: Option<FrameThunk>) -> Result<(), DeviceError> {
        match thunk {
            Some(thunk) => {
                let boxed = Box::new(thunk);
                self.request(
                    "set user data",
                    WM_CAP_SET_USER_DATA,
                    0,
                    &*boxed as *const FrameThunk as isize,
                )?;
                // the window now points at the box; keep it before enabling delivery
                self.thunk = Some(boxed);
                self.request(
                    "set frame callback",
                    WM_CAP_SET_CALLBACK_FRAME,
                    0,
                    frame_callback as usize as isize,
                )
            }
            None => {
                self.request("clear frame callback", WM_CAP_SET_CALLBACK_FRAME, 0, 0)?;
                self.send(WM_CAP_SET_USER_DATA, 0, 0);
                self.thunk = None;
                Ok(())
            }
        }
    }

    fn set_preview_scale(&mut self, enabled: bool) -> Result<(), DeviceError> {
        self.request("set scale", WM_CAP_SET_SCALE, enabled as usize, 0)
    }

    fn set_preview_rate(&mut self, milliseconds: u32) -> Result<(), DeviceError> {
        self.request("set preview rate", WM_CAP_SET_PREVIEWRATE, milliseconds as usize, 0)
    }

    fn set_preview(&mut self, enabled: bool) -> Result<(), DeviceError> {
        self.request("set preview", WM_CAP_SET_PREVIEW, enabled as usize, 0)
    }

    fn destroy(&mut self) -> Result<(), DeviceError> {
        if self.hwnd.is_invalid() {
            return Ok(());
        }
        // callbacks run inside this thread's message dispatch, so none is
        // in flight while we are here
        if let Err(err) = unsafe { DestroyWindow(self.hwnd) } {
            // the window may still call back through the thunk, keep both
            return Err(DeviceError::Driver(format!(
                "couldn't destroy capture window: {err}"
            )));
        }
        self.hwnd = HWND::default();
        self.thunk = None;
        Ok(())
    }
}

impl Drop for VfwDriver {
    fn drop(&mut self) {
        if let Err(err) = self.destroy() {
            log::error!("{err}, leaking its frame callback");
            if let Some(thunk) = self.thunk.take() {
                std::mem::forget(thunk);
            }
        }
    }
}

unsafe extern "system" fn frame_callback(hwnd: HWND, header: *const NativeVideoHeader) -> LRESULT {
    if header.is_null() {
        return LRESULT(1);
    }
    let user = unsafe { SendMessageW(hwnd, WM_CAP_GET_USER_DATA, None, None) }.0;
    let thunk = user as *const FrameThunk;
    if thunk.is_null() {
        return LRESULT(1);
    }
    let native = unsafe { &*header };
    let header = VideoHeader {
        data: native.data.cast_const(),
        bytes_used: native.bytes_used,
        time_captured: native.time_captured,
    };
    unsafe { (*thunk).invoke(&header) };
    LRESULT(1)
}

/// Dispatch every message waiting on the current thread's queue.
///
/// Preview frames are delivered from inside this call. Returns the number of
/// messages processed.
pub fn pump_messages() -> usize {
    let mut msg = MSG::default();
    let mut count = 0;
    while unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool() {
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
        count += 1;
    }
    count
}
