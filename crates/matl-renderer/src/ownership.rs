//! Scoped ownership of the GPU context
//!
//! The render loop draws frames while the context is [`ContextState::Rendering`].
//! Any other operation that touches GPU state first takes a [`ContextGuard`]:
//! that stops the loop, waits for the frame in flight, and restores the loop when
//! the guard is dropped. Dropping happens on every exit path, including errors
//! and unwinding.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, MutexGuard};

/// Whether the render loop is currently allowed to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Idle,
    Rendering,
}

/// Coordinates the render loop with ad hoc GPU work.
#[derive(Debug, Default)]
pub struct RenderLoopControl {
    rendering: AtomicBool,
    frame: Mutex<()>,
}

impl RenderLoopControl {
    /// Create a control in the `Idle` state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ContextState {
        if self.rendering.load(Ordering::Acquire) {
            ContextState::Rendering
        } else {
            ContextState::Idle
        }
    }

    pub fn is_rendering(&self) -> bool {
        self.state() == ContextState::Rendering
    }

    /// Allow the render loop to draw.
    pub fn resume(&self) {
        self.rendering.store(true, Ordering::Release);
    }

    /// Stop the render loop and wait for the frame in flight to finish.
    pub fn pause(&self) {
        self.rendering.store(false, Ordering::Release);
        drop(self.frame.lock());
    }

    /// Take ownership of the context for the guard's lifetime.
    ///
    /// Rendering resumes on drop only if it was running when the guard was taken,
    /// so nested guards leave the loop paused until the outermost one is dropped.
    pub fn acquire(&self) -> ContextGuard<'_> {
        let resume = self.is_rendering();
        if resume {
            self.pause();
        }
        ContextGuard {
            control: self,
            resume,
        }
    }

    /// Start a frame if the loop is allowed to draw.
    ///
    /// The returned token blocks [`pause`](Self::pause) until it is dropped.
    pub fn begin_frame(&self) -> Option<FrameToken<'_>> {
        let lock = self.frame.lock();
        if self.is_rendering() {
            Some(FrameToken { _lock: lock })
        } else {
            None
        }
    }
}

/// Exclusive use of the GPU context. Restores rendering on drop.
#[must_use = "the context is released as soon as the guard is dropped"]
pub struct ContextGuard<'a> {
    control: &'a RenderLoopControl,
    resume: bool,
}

impl ContextGuard<'_> {
    /// Whether rendering will resume when this guard is dropped
    pub fn resumes_rendering(&self) -> bool {
        self.resume
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        if self.resume {
            self.control.resume();
        }
    }
}

/// A frame in flight.
pub struct FrameToken<'a> {
    _lock: MutexGuard<'a, ()>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn test_guard_restores_rendering() {
        let control = RenderLoopControl::new();
        control.resume();
        {
            let guard = control.acquire();
            assert!(guard.resumes_rendering());
            assert_eq!(control.state(), ContextState::Idle);
        }
        assert_eq!(control.state(), ContextState::Rendering);
    }

    #[test]
    fn test_guard_keeps_idle() {
        let control = RenderLoopControl::new();
        {
            let _guard = control.acquire();
            assert!(control.begin_frame().is_none());
        }
        assert_eq!(control.state(), ContextState::Idle);
    }

    #[test]
    fn test_nested_guards() {
        let control = RenderLoopControl::new();
        control.resume();
        {
            let _outer = control.acquire();
            {
                let inner = control.acquire();
                assert!(!inner.resumes_rendering());
            }
            assert_eq!(control.state(), ContextState::Idle);
        }
        assert!(control.is_rendering());
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let control = RenderLoopControl::new();
        control.resume();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = control.acquire();
            panic!("load failed");
        }));

        assert!(result.is_err());
        assert!(control.is_rendering());
    }

    #[test]
    fn test_guard_restores_on_error() {
        fn failing(control: &RenderLoopControl) -> Result<(), String> {
            let _guard = control.acquire();
            Err("capture failed".to_string())
        }

        let control = RenderLoopControl::new();
        control.resume();
        assert!(failing(&control).is_err());
        assert!(control.is_rendering());
    }

    #[test]
    fn test_pause_waits_for_frame_in_flight() {
        let control = Arc::new(RenderLoopControl::new());
        control.resume();
        let frames_done = Arc::new(AtomicUsize::new(0));

        let token = control.begin_frame().expect("rendering");

        let waiter = {
            let control = Arc::clone(&control);
            let frames_done = Arc::clone(&frames_done);
            std::thread::spawn(move || {
                let _guard = control.acquire();
                frames_done.load(Ordering::SeqCst)
            })
        };

        std::thread::sleep(Duration::from_millis(50));
        frames_done.store(1, Ordering::SeqCst);
        drop(token);

        // The guard was only granted after the frame finished
        assert_eq!(waiter.join().unwrap(), 1);
        assert!(control.is_rendering());
    }
}
