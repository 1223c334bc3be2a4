use crate::driver::{FrameThunk, VideoHeader};
use crate::event::FrameEvent;
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// A frame subscriber. Called on the driver's thread, once per frame.
pub type FrameHandler = Arc<dyn Fn(&FrameEvent<'_>) + Send + Sync>;

/// Re-emits driver frames to the current subscriber.
#[derive(Default)]
pub(crate) struct FrameDispatcher {
    handler: RwLock<Option<FrameHandler>>,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl FrameDispatcher {
    pub fn set_handler(&self, handler: Option<FrameHandler>) {
        let mut slot = self.handler.write().unwrap_or_else(|e| e.into_inner());
        *slot = handler;
    }

    pub fn has_handler(&self) -> bool {
        self.handler.read().map(|h| h.is_some()).unwrap_or(false)
    }

    pub fn delivered_frames(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn dispatch(&self, event: &FrameEvent<'_>) {
        // clone out so the handler runs without the lock held
        let handler = self
            .handler
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let Some(handler) = handler else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                log::error!("frame handler panicked at {:?}", event.timestamp());
            }
        }
    }

    fn dispatch_header(&self, header: &VideoHeader) {
        match unsafe { FrameEvent::from_header(header) } {
            Some(event) => self.dispatch(&event),
            None => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!(
                    "dropping malformed frame: no data for {} bytes at {}ms",
                    header.bytes_used,
                    header.time_captured
                );
            }
        }
    }
}

// SAFETY: `context` comes from `PinnedDispatcher`, which keeps the dispatcher
// alive until the driver that holds the thunk is destroyed.
unsafe fn dispatch_entry(context: NonNull<c_void>, header: &VideoHeader) {
    let dispatcher = unsafe { context.cast::<FrameDispatcher>().as_ref() };
    dispatcher.dispatch_header(header);
}

/// A strong reference to a dispatcher, leaked to a stable address for as
/// long as a driver may call into it.
pub(crate) struct PinnedDispatcher {
    raw: NonNull<FrameDispatcher>,
}

// Only shared access to the dispatcher goes through `raw`.
unsafe impl Send for PinnedDispatcher {}
unsafe impl Sync for PinnedDispatcher {}

impl PinnedDispatcher {
    pub fn new(dispatcher: &Arc<FrameDispatcher>) -> Self {
        let raw = Arc::into_raw(Arc::clone(dispatcher)).cast_mut();
        // Arc::into_raw never returns null
        Self {
            raw: unsafe { NonNull::new_unchecked(raw) },
        }
    }

    pub fn thunk(&self) -> FrameThunk {
        FrameThunk::new(self.raw.cast(), dispatch_entry)
    }
}

impl Drop for PinnedDispatcher {
    fn drop(&mut self) {
        drop(unsafe { Arc::from_raw(self.raw.as_ptr().cast_const()) });
    }
}
