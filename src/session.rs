//! State owned by the event loop, and the loop itself.
//!
//! A [`Session`] bundles the [`WindowManager`] with the process lifecycle
//! signal.  It lives on exactly one thread; command handlers reach it only
//! through the [`bridge`](crate::bridge).

use crate::bridge::{BridgeError, Executor};
use log::{info, warn};
use std::time::Duration;

use crate::traits::WindowManager;

/// What the event loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopSignal {
    #[default]
    Continue,
    RestartRequested,
    QuitRequested,
}

/// Window manager state plus lifecycle intent.
pub struct Session<W: WindowManager> {
    pub wm: W,
    signal: LoopSignal,
}

impl<W: WindowManager> Session<W> {
    pub fn new(wm: W) -> Self {
        Self {
            wm,
            signal: LoopSignal::Continue,
        }
    }

    pub fn signal(&self) -> LoopSignal {
        self.signal
    }

    /// Ask the event loop to stop and re-execute the process.
    pub fn request_restart(&mut self) {
        self.signal = LoopSignal::RestartRequested;
    }

    /// Ask the event loop to stop.
    pub fn request_quit(&mut self) {
        self.signal = LoopSignal::QuitRequested;
    }

    /// Drive the event loop until a handler requests restart or quit.
    ///
    /// Each iteration processes native window manager events, then executes
    /// at most one bridged command (waiting up to `tick` for one).  If every
    /// caller handle has been dropped the loop ends with
    /// [`LoopSignal::QuitRequested`].
    pub fn run<R>(&mut self, executor: &Executor<Self, R>, tick: Duration) -> LoopSignal {
        loop {
            if let Err(e) = self.wm.process_events() {
                warn!("event processing failed: {}", e);
            }

            match executor.wait_and_execute(self, tick) {
                Ok(_) => {}
                Err(BridgeError::Closed) => {
                    info!("all command sources closed, exiting");
                    return LoopSignal::QuitRequested;
                }
            }

            if self.signal != LoopSignal::Continue {
                info!("event loop stopping: {:?}", self.signal);
                return self.signal;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge;
    use crate::headless::HeadlessWm;
    use std::thread;

    #[test]
    fn new_session_continues() {
        let session = Session::new(HeadlessWm::default());
        assert_eq!(session.signal(), LoopSignal::Continue);
    }

    #[test]
    fn run_returns_requested_signal() {
        let (handle, executor) = bridge::channel::<Session<HeadlessWm>, ()>();
        let caller = thread::spawn(move || {
            handle.run_sync(|s| s.request_restart()).unwrap();
            handle
        });
        let mut session = Session::new(HeadlessWm::default());
        let signal = session.run(&executor, Duration::from_millis(5));
        assert_eq!(signal, LoopSignal::RestartRequested);
        drop(caller.join().unwrap());
    }

    #[test]
    fn run_quits_when_callers_are_gone() {
        let (handle, executor) = bridge::channel::<Session<HeadlessWm>, ()>();
        drop(handle);
        let mut session = Session::new(HeadlessWm::default());
        assert_eq!(
            session.run(&executor, Duration::from_millis(5)),
            LoopSignal::QuitRequested
        );
    }

    #[test]
    fn event_processing_interleaves_with_commands() {
        let (handle, executor) = bridge::channel::<Session<HeadlessWm>, u64>();
        let caller = thread::spawn(move || {
            let first = handle.run_sync(|s| s.wm.event_steps()).unwrap();
            let second = handle.run_sync(|s| s.wm.event_steps()).unwrap();
            handle.run_sync(|s| {
                s.request_quit();
                0
            })
            .unwrap();
            (first, second)
        });
        let mut session = Session::new(HeadlessWm::default());
        session.run(&executor, Duration::from_millis(5));
        let (first, second) = caller.join().unwrap();
        assert!(first >= 1);
        assert!(second > first);
    }
}
