use crate::dispatch::{FrameDispatcher, FrameHandler, PinnedDispatcher};
use crate::driver::{CaptureDriver, frames_per_1000_second, micro_seconds_per_frame};
use crate::{DeviceError, FrameEvent, SessionConfig, Transcoder};
use camlet_image::{BitmapInfoHeader, CaptureBuffer, FrameFormat, fourcc_to_string};
use std::sync::Arc;

/// An open capture device.
///
/// Owns the driver from a successful `open` until `dispose` (or drop). The
/// format reported by `characteristics` is the one the driver actually
/// settled on, which may differ from the requested one.
pub struct CaptureSession {
    driver: Option<Box<dyn CaptureDriver>>,
    identity: u32,
    characteristics: FrameFormat,
    descriptor: Option<Vec<u8>>,
    transcode_yuv: bool,
    preview_rate_ms: u32,
    dispatcher: Arc<FrameDispatcher>,
    pin: Option<PinnedDispatcher>,
    started: bool,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("identity", &self.identity)
            .field("characteristics", &self.characteristics)
            .field("open", &self.driver.is_some())
            .field("started", &self.started)
            .field("subscribed", &self.dispatcher.has_handler())
            .finish()
    }
}

impl CaptureSession {
    /// Connect `driver` to a device and negotiate the configured format.
    ///
    /// # Errors
    ///
    /// - `DeviceError::Open` if the driver cannot connect.
    /// - `DeviceError::Format` if the driver reports no usable format or
    ///   frame rate.
    /// - `DeviceError::Driver` if the frame callback cannot be registered.
    ///
    /// On error the driver has already been disconnected and destroyed.
    pub fn open<D>(driver: D, config: &SessionConfig) -> Result<Self, DeviceError>
    where
        D: CaptureDriver + 'static,
    {
        let mut driver: Box<dyn CaptureDriver> = Box::new(driver);
        let identity = config.identity();

        if let Err(err) = driver.connect(identity) {
            if let Err(err) = driver.destroy() {
                log::warn!("{err}");
            }
            return Err(DeviceError::Open(format!(
                "couldn't connect to capture device {identity}: {err}"
            )));
        }

        let (characteristics, descriptor) = match negotiate(driver.as_mut(), config.format()) {
            Ok(negotiated) => negotiated,
            Err(err) => {
                teardown(driver.as_mut());
                return Err(err);
            }
        };

        let dispatcher = Arc::new(FrameDispatcher::default());
        let pin = PinnedDispatcher::new(&dispatcher);
        if let Err(err) = driver.set_frame_callback(Some(pin.thunk())) {
            if teardown(driver.as_mut()) {
                drop(pin);
            } else {
                std::mem::forget(pin);
            }
            return Err(DeviceError::Driver(format!(
                "couldn't register frame callback: {err}"
            )));
        }

        log::info!("opened capture device {identity}: {characteristics}");
        Ok(Self {
            driver: Some(driver),
            identity,
            characteristics,
            descriptor: Some(descriptor),
            transcode_yuv: config.transcode_yuv(),
            preview_rate_ms: config.preview_rate_ms(),
            dispatcher,
            pin: Some(pin),
            started: false,
        })
    }

    /// The negotiated format.
    pub fn characteristics(&self) -> &FrameFormat {
        &self.characteristics
    }

    pub fn identity(&self) -> u32 {
        self.identity
    }

    /// The raw format descriptor read back from the driver, until disposal.
    pub fn descriptor(&self) -> Option<&[u8]> {
        self.descriptor.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.driver.is_some()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Install the frame handler, replacing any previous one.
    ///
    /// The handler runs on the driver's thread; it must not install another
    /// handler itself.
    pub fn on_frame<F>(&self, handler: F) -> Result<(), DeviceError>
    where
        F: Fn(&FrameEvent<'_>) + Send + Sync + 'static,
    {
        self.ensure_open()?;
        let handler: FrameHandler = Arc::new(handler);
        self.dispatcher.set_handler(Some(handler));
        Ok(())
    }

    pub fn clear_frame_handler(&self) -> Result<(), DeviceError> {
        self.ensure_open()?;
        self.dispatcher.set_handler(None);
        Ok(())
    }

    /// Frames handed to a handler that returned normally.
    pub fn delivered_frames(&self) -> u64 {
        self.dispatcher.delivered_frames()
    }

    /// Frames that arrived with no handler installed, were malformed, or made
    /// the handler panic.
    pub fn dropped_frames(&self) -> u64 {
        self.dispatcher.dropped_frames()
    }

    /// Start frame delivery.
    pub fn start(&mut self) -> Result<(), DeviceError> {
        let preview_rate_ms = self.preview_rate_ms;
        let driver = self.driver_mut()?;
        driver.set_preview_scale(false)?;
        driver.set_preview_rate(preview_rate_ms)?;
        driver.set_preview(true)?;
        self.started = true;
        log::info!("capture device {} started", self.identity);
        Ok(())
    }

    /// Stop frame delivery. Stopping a stopped session is a no-op.
    pub fn stop(&mut self) -> Result<(), DeviceError> {
        self.driver_mut()?.set_preview(false)?;
        if self.started {
            log::info!("capture device {} stopped", self.identity);
        }
        self.started = false;
        Ok(())
    }

    /// Release the device. Safe to call more than once.
    ///
    /// Once this returns no frame handler is running or will run again.
    pub fn dispose(&mut self) {
        let Some(mut driver) = self.driver.take() else {
            return;
        };
        if let Err(err) = driver.set_preview(false) {
            log::warn!("couldn't stop preview: {err}");
        }
        if let Err(err) = driver.set_frame_callback(None) {
            log::warn!("couldn't unregister frame callback: {err}");
        }
        if teardown(driver.as_mut()) {
            drop(driver);
            // the driver is gone, nothing can call through the pin anymore
            self.pin = None;
        } else {
            // the driver may still deliver frames, keep both alive for good
            std::mem::forget(driver);
            std::mem::forget(self.pin.take());
        }
        self.descriptor = None;
        self.dispatcher.set_handler(None);
        self.started = false;
        log::info!("capture device {} disposed", self.identity);
    }

    /// Copy a delivered frame into `buffer`.
    pub fn capture(
        &self,
        event: &FrameEvent<'_>,
        buffer: &mut CaptureBuffer,
    ) -> Result<(), DeviceError> {
        self.ensure_open()?;
        self.transcoder().capture(event, buffer);
        Ok(())
    }

    /// A detached copy of the capture settings for use inside frame handlers.
    pub fn transcoder(&self) -> Transcoder {
        Transcoder::new(self.characteristics, self.transcode_yuv)
    }

    fn ensure_open(&self) -> Result<(), DeviceError> {
        if self.driver.is_some() {
            Ok(())
        } else {
            Err(DeviceError::Closed)
        }
    }

    fn driver_mut(&mut self) -> Result<&mut Box<dyn CaptureDriver>, DeviceError> {
        self.driver.as_mut().ok_or(DeviceError::Closed)
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if self.pin.is_some() {
            self.dispose();
        }
    }
}

/// Ask for `requested`, then read back what the driver actually uses.
fn negotiate(
    driver: &mut dyn CaptureDriver,
    requested: &FrameFormat,
) -> Result<(FrameFormat, Vec<u8>), DeviceError> {
    let mut parameters = driver.parameters().map_err(|err| {
        DeviceError::Format(format!("couldn't read capture parameters: {err}"))
    })?;
    parameters.micro_seconds_per_frame =
        micro_seconds_per_frame(requested.frames_per_1000_second());
    if let Err(err) = driver.set_parameters(&parameters) {
        log::warn!("driver rejected frame interval: {err}");
    }
    let parameters = driver.parameters().map_err(|err| {
        DeviceError::Format(format!("couldn't read capture parameters: {err}"))
    })?;
    let rate = frames_per_1000_second(parameters.micro_seconds_per_frame);
    log::debug!(
        "frame interval {}us ({} frames per 1000s)",
        parameters.micro_seconds_per_frame,
        rate
    );
    if rate == 0 {
        return Err(DeviceError::Format(format!(
            "couldn't negotiate format: frame interval {}us",
            parameters.micro_seconds_per_frame
        )));
    }

    let header = BitmapInfoHeader::from_format(requested);
    if let Err(err) = driver.set_video_format(&header) {
        log::warn!("driver rejected {requested}: {err}");
    }

    let descriptor = driver
        .video_format()
        .map_err(|err| DeviceError::Format(format!("couldn't negotiate format: {err}")))?;
    let actual = BitmapInfoHeader::from_bytes(&descriptor).ok_or_else(|| {
        DeviceError::Format(format!(
            "couldn't negotiate format: malformed descriptor of {} bytes",
            descriptor.len()
        ))
    })?;
    log::debug!("driver descriptor {actual:?}");
    let characteristics = actual.to_frame_format(rate).ok_or_else(|| {
        DeviceError::Format(format!(
            "couldn't negotiate format: unsupported {}x{} {}-bit {}",
            actual.width,
            actual.height,
            actual.bit_count,
            fourcc_to_string(actual.compression)
        ))
    })?;

    if characteristics != *requested {
        log::warn!("requested {requested}, driver settled on {characteristics}");
    }
    Ok((characteristics, descriptor))
}

/// Disconnect and destroy. Returns false if the driver could not be
/// destroyed and may still call its frame thunk.
fn teardown(driver: &mut dyn CaptureDriver) -> bool {
    if let Err(err) = driver.disconnect() {
        log::warn!("couldn't disconnect capture driver: {err}");
    }
    match driver.destroy() {
        Ok(()) => true,
        Err(err) => {
            log::error!("{err}");
            false
        }
    }
}
