//! Shows a VFW capture device in a window.
//!
//! Usage: `camlet-view [DEVICE_INDEX]`

#[cfg(windows)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use camlet_device::{CaptureSession, SessionConfig, VfwDriver, pump_messages};
    use minifb::{Key, Window, WindowOptions};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    camlet_base::init_stdout_logger();

    let identity = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 0,
    };
    let config = SessionConfig::default().with_identity(identity);
    let mut session = CaptureSession::open(VfwDriver::new()?, &config)?;
    let format = *session.characteristics();
    log::info!("capturing {format}");

    // the handler only copies a frame once the previous one has been shown
    let transcoder = session.transcoder();
    let latest = Arc::new(Mutex::new(transcoder.buffer()));
    let ready = Arc::new(AtomicBool::new(false));
    {
        let latest = Arc::clone(&latest);
        let ready = Arc::clone(&ready);
        session.on_frame(move |event| {
            if ready.load(Ordering::Acquire) {
                return;
            }
            if let Ok(mut buffer) = latest.lock() {
                transcoder.capture(event, &mut buffer);
                ready.store(true, Ordering::Release);
            }
        })?;
    }
    session.start()?;

    let width = format.width() as usize;
    let height = format.height() as usize;
    let mut window = Window::new(
        "camlet - ESC to exit",
        width,
        height,
        WindowOptions::default(),
    )?;
    window.set_target_fps(60);
    let mut pixels = vec![0u32; width * height];

    while window.is_open() && !window.is_key_down(Key::Escape) {
        pump_messages();

        if !ready.load(Ordering::Acquire) {
            window.update();
            continue;
        }
        let frame = match latest.lock() {
            Ok(buffer) => buffer.to_rgb(),
            Err(_) => break,
        };
        ready.store(false, Ordering::Release);

        match frame {
            Ok(frame) if frame.width as usize == width && frame.height as usize == height => {
                for (pixel, rgb) in pixels.iter_mut().zip(frame.data.chunks_exact(3)) {
                    *pixel = (rgb[0] as u32) << 16 | (rgb[1] as u32) << 8 | rgb[2] as u32;
                }
                window.update_with_buffer(&pixels, width, height)?;
            }
            Ok(frame) => {
                log::warn!("skipping {}x{} frame", frame.width, frame.height);
            }
            Err(err) => {
                log::warn!("couldn't decode frame: {err}");
            }
        }
    }

    session.dispose();
    log::info!(
        "{} frames delivered, {} dropped",
        session.delivered_frames(),
        session.dropped_frames()
    );
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    camlet_base::init_stdout_logger();
    log::error!("camlet-view needs Video for Windows");
    std::process::exit(1);
}
