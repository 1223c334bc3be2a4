use crate::{CaptureSession, DeviceError};
use camlet_image::CaptureBuffer;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};

/// A frame copied out of driver memory.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub timestamp: Duration,
    pub buffer: CaptureBuffer,
}

/// Async camera trait for frame capture.
#[allow(async_fn_in_trait)]
pub trait Camera {
    /// Receive the next frame from the camera.
    async fn recv(&mut self) -> Result<CapturedFrame, DeviceError>;
}

/// Receiving end of `CaptureSession::frames`.
#[derive(Debug)]
pub struct FrameReceiver {
    receiver: mpsc::Receiver<CapturedFrame>,
}

impl Camera for FrameReceiver {
    async fn recv(&mut self) -> Result<CapturedFrame, DeviceError> {
        self.receiver
            .recv()
            .await
            .ok_or_else(|| DeviceError::Channel("capture session closed".to_string()))
    }
}

impl FrameReceiver {
    /// Take a frame if one is already waiting.
    pub fn try_recv(&mut self) -> Option<CapturedFrame> {
        self.receiver.try_recv().ok()
    }
}

impl CaptureSession {
    /// Stream frames into a bounded channel of `capacity` frames.
    ///
    /// Replaces the current frame handler. Frames arriving while the channel
    /// is full are dropped without being copied.
    pub fn frames(&self, capacity: usize) -> Result<FrameReceiver, DeviceError> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let transcoder = self.transcoder();

        self.on_frame(move |event| {
            let permit = match tx.try_reserve() {
                Ok(permit) => permit,
                Err(TrySendError::Full(())) => {
                    log::trace!("frame at {:?} dropped, receiver is behind", event.timestamp());
                    return;
                }
                Err(TrySendError::Closed(())) => return,
            };
            let mut buffer = transcoder.buffer();
            transcoder.capture(event, &mut buffer);
            permit.send(CapturedFrame {
                timestamp: event.timestamp(),
                buffer,
            });
        })?;

        Ok(FrameReceiver { receiver: rx })
    }
}
