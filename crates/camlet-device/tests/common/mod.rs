#![allow(dead_code)]

use camlet_device::{CaptureDriver, CaptureParameters, DeviceError, FrameThunk, VideoHeader};
use camlet_image::BitmapInfoHeader;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// Driver-side state shared between a `FakeDriver` and its `FakeHandle`.
#[derive(Debug, Default)]
pub struct DriverState {
    pub calls: Vec<String>,
    pub identity: Option<u32>,
    pub parameters: CaptureParameters,
    pub descriptor: Vec<u8>,
    pub thunk: Option<FrameThunk>,
    pub preview: bool,
    pub destroyed: bool,
    pub fail_connect: bool,
    pub ignore_parameters: bool,
    pub reject_format: bool,
    pub malformed_descriptor: bool,
    pub fail_destroy: bool,
}

/// A scripted stand-in for a native capture driver.
///
/// Accepts every request unless told otherwise and reports back exactly what
/// was accepted, like a cooperative driver would.
///
/// Deliveries hold `delivery` for reading while the thunk runs and `destroy`
/// takes it for writing, so a successful destroy waits for any frame still
/// in flight.
pub struct FakeDriver {
    state: Arc<Mutex<DriverState>>,
    delivery: Arc<RwLock<()>>,
}

/// Test-side view of a `FakeDriver` that has been moved into a session.
#[derive(Clone)]
pub struct FakeHandle {
    state: Arc<Mutex<DriverState>>,
    delivery: Arc<RwLock<()>>,
}

pub fn fake_driver() -> (FakeDriver, FakeHandle) {
    let mut parameters = CaptureParameters::default();
    parameters.micro_seconds_per_frame = 66_666;
    let state = Arc::new(Mutex::new(DriverState {
        parameters,
        ..Default::default()
    }));
    let delivery = Arc::new(RwLock::new(()));
    (
        FakeDriver {
            state: Arc::clone(&state),
            delivery: Arc::clone(&delivery),
        },
        FakeHandle { state, delivery },
    )
}

impl FakeHandle {
    pub fn configure(&self, f: impl FnOnce(&mut DriverState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn called(&self, name: &str) -> bool {
        self.state.lock().unwrap().calls.iter().any(|c| c == name)
    }

    /// The identity passed to the last `connect`.
    pub fn identity(&self) -> Option<u32> {
        self.state.lock().unwrap().identity
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.lock().unwrap().destroyed
    }

    pub fn is_previewing(&self) -> bool {
        self.state.lock().unwrap().preview
    }

    pub fn has_callback(&self) -> bool {
        self.state.lock().unwrap().thunk.is_some()
    }

    /// Deliver one frame the way the native preview pump would.
    ///
    /// Returns false when no callback is registered.
    pub fn fire(&self, data: &[u8], time_captured: u32) -> bool {
        let header = VideoHeader {
            data: data.as_ptr(),
            bytes_used: data.len() as u32,
            time_captured,
        };
        self.fire_header(&header)
    }

    pub fn fire_header(&self, header: &VideoHeader) -> bool {
        let _delivering = self.delivery.read().unwrap();
        // copy the thunk out so the handler runs without the state lock
        let thunk = self.state.lock().unwrap().thunk;
        match thunk {
            Some(thunk) => {
                unsafe { thunk.invoke(header) };
                true
            }
            None => false,
        }
    }
}

impl FakeDriver {
    fn record(&self, call: &str) -> MutexGuard<'_, DriverState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        state
    }

    fn log_call(&self, call: &str) {
        self.state.lock().unwrap().calls.push(call.to_string());
    }
}

impl CaptureDriver for FakeDriver {
    fn connect(&mut self, identity: u32) -> Result<(), DeviceError> {
        let mut state = self.record("connect");
        state.identity = Some(identity);
        if state.fail_connect {
            return Err(DeviceError::Driver("no such device".to_string()));
        }
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), DeviceError> {
        self.log_call("disconnect");
        Ok(())
    }

    fn parameters(&mut self) -> Result<CaptureParameters, DeviceError> {
        Ok(self.record("parameters").parameters)
    }

    fn set_parameters(&mut self, parameters: &CaptureParameters) -> Result<(), DeviceError> {
        let mut state = self.record("set_parameters");
        if !state.ignore_parameters {
            state.parameters = *parameters;
        }
        Ok(())
    }

    fn set_video_format(&mut self, header: &BitmapInfoHeader) -> Result<(), DeviceError> {
        let mut state = self.record("set_video_format");
        if state.reject_format {
            return Err(DeviceError::Driver("format not supported".to_string()));
        }
        state.descriptor = header.to_bytes().to_vec();
        Ok(())
    }

    fn video_format(&mut self) -> Result<Vec<u8>, DeviceError> {
        let state = self.record("video_format");
        if state.malformed_descriptor {
            return Ok(vec![0; 12]);
        }
        Ok(state.descriptor.clone())
    }

    fn set_frame_callback(&mut self, thunk: Option<FrameThunk>) -> Result<(), DeviceError> {
        let mut state = self.record(if thunk.is_some() {
            "set_frame_callback"
        } else {
            "clear_frame_callback"
        });
        state.thunk = thunk;
        Ok(())
    }

    fn set_preview_scale(&mut self, _enabled: bool) -> Result<(), DeviceError> {
        self.log_call("set_preview_scale");
        Ok(())
    }

    fn set_preview_rate(&mut self, _milliseconds: u32) -> Result<(), DeviceError> {
        self.log_call("set_preview_rate");
        Ok(())
    }

    fn set_preview(&mut self, enabled: bool) -> Result<(), DeviceError> {
        let mut state = self.record("set_preview");
        state.preview = enabled;
        Ok(())
    }

    fn destroy(&mut self) -> Result<(), DeviceError> {
        if self.record("destroy").fail_destroy {
            return Err(DeviceError::Driver("window still busy".to_string()));
        }
        let _idle = self.delivery.write().unwrap();
        let mut state = self.state.lock().unwrap();
        state.thunk = None;
        state.destroyed = true;
        Ok(())
    }
}
