//! Synchronous execution of closures on the thread that owns the window
//! manager state.
//!
//! [`channel`] returns a pair:
//!
//! * [`BridgeHandle`]: cloned freely and shared between caller threads.
//!   [`run_sync`](BridgeHandle::run_sync) submits a closure and blocks until
//!   the owner has run it and handed back the result.
//! * [`Executor`]: held by the owning event loop, which calls
//!   [`drain_and_execute_one_pending`](Executor::drain_and_execute_one_pending)
//!   between its own processing steps.
//!
//! Both directions use capacity-one channels.  The reply receiver lives
//! inside the handle's mutex, so a caller holds the lock from submission
//! until its own reply arrives and two callers can never pick up each
//! other's results.  As a consequence at most one closure is in flight at
//! any time and closures run in a total order.

use log::debug;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A unit of work executed against the owner's state.
pub type Task<S, R> = Box<dyn FnOnce(&mut S) -> R + Send>;

/// Errors produced by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The other side of the bridge has been dropped.
    #[error("the owning event loop is not running")]
    Closed,
}

struct Slot<S, R> {
    submit: SyncSender<Task<S, R>>,
    reply: Receiver<R>,
}

/// Caller side of the bridge.
pub struct BridgeHandle<S, R> {
    slot: Arc<Mutex<Slot<S, R>>>,
}

impl<S, R> Clone for BridgeHandle<S, R> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

/// Owner side of the bridge.
pub struct Executor<S, R> {
    tasks: Receiver<Task<S, R>>,
    replies: SyncSender<R>,
}

/// Create a connected handle / executor pair.
pub fn channel<S, R>() -> (BridgeHandle<S, R>, Executor<S, R>) {
    let (task_tx, task_rx) = mpsc::sync_channel(1);
    let (reply_tx, reply_rx) = mpsc::sync_channel(1);
    let handle = BridgeHandle {
        slot: Arc::new(Mutex::new(Slot {
            submit: task_tx,
            reply: reply_rx,
        })),
    };
    let executor = Executor {
        tasks: task_rx,
        replies: reply_tx,
    };
    (handle, executor)
}

impl<S, R> BridgeHandle<S, R> {
    /// Run `f` on the owning thread and return its result.
    ///
    /// Blocks the calling thread for the whole round trip.  There is no
    /// timeout: a closure that never finishes stalls every other caller.
    pub fn run_sync<F>(&self, f: F) -> Result<R, BridgeError>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
    {
        // A panicking caller cannot leave the slot half-used: the lock is
        // only poisoned between send and recv, and neither panics.
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.submit
            .send(Box::new(f))
            .map_err(|_| BridgeError::Closed)?;
        slot.reply.recv().map_err(|_| BridgeError::Closed)
    }
}

impl<S, R> Executor<S, R> {
    /// Execute at most one pending closure without blocking.
    ///
    /// Returns `Ok(true)` if a closure ran, `Ok(false)` if none was waiting,
    /// and [`BridgeError::Closed`] once every handle has been dropped.
    pub fn drain_and_execute_one_pending(&self, state: &mut S) -> Result<bool, BridgeError> {
        match self.tasks.try_recv() {
            Ok(task) => {
                self.execute(state, task);
                Ok(true)
            }
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => Err(BridgeError::Closed),
        }
    }

    /// Like [`drain_and_execute_one_pending`](Self::drain_and_execute_one_pending)
    /// but waits up to `timeout` for a closure to arrive.
    pub fn wait_and_execute(&self, state: &mut S, timeout: Duration) -> Result<bool, BridgeError> {
        match self.tasks.recv_timeout(timeout) {
            Ok(task) => {
                self.execute(state, task);
                Ok(true)
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::Closed),
        }
    }

    fn execute(&self, state: &mut S, task: Task<S, R>) {
        let result = task(state);
        if self.replies.send(result).is_err() {
            debug!("caller went away before its result was delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    /// Run an owner loop on a background thread until all handles are gone,
    /// then hand the final state back.
    fn spawn_owner<S: Send + 'static, R: Send + 'static>(
        mut state: S,
        executor: Executor<S, R>,
    ) -> thread::JoinHandle<S> {
        thread::spawn(move || {
            while executor
                .wait_and_execute(&mut state, Duration::from_millis(10))
                .is_ok()
            {}
            state
        })
    }

    #[test]
    fn returns_closure_result() {
        let (handle, executor) = channel::<u32, u32>();
        let owner = spawn_owner(40, executor);
        let r = handle.run_sync(|n| {
            *n += 2;
            *n
        });
        assert_eq!(r, Ok(42));
        drop(handle);
        assert_eq!(owner.join().unwrap(), 42);
    }

    #[test]
    fn concurrent_callers_never_interleave() {
        let (handle, executor) = channel::<Vec<String>, usize>();
        let owner = spawn_owner(Vec::new(), executor);

        let callers: Vec<_> = (0..16)
            .map(|i| {
                let handle = handle.clone();
                thread::spawn(move || {
                    for j in 0..10 {
                        let got = handle
                            .run_sync(move |log: &mut Vec<String>| {
                                log.push(format!("begin {}.{}", i, j));
                                log.push(format!("end {}.{}", i, j));
                                i * 100 + j
                            })
                            .unwrap();
                        // Each caller receives its own result.
                        assert_eq!(got, i * 100 + j);
                    }
                })
            })
            .collect();
        for c in callers {
            c.join().unwrap();
        }
        drop(handle);

        let log = owner.join().unwrap();
        assert_eq!(log.len(), 16 * 10 * 2);
        for pair in log.chunks(2) {
            let begin = pair[0].strip_prefix("begin ").unwrap();
            let end = pair[1].strip_prefix("end ").unwrap();
            assert_eq!(begin, end);
        }
    }

    #[test]
    fn drain_runs_at_most_one() {
        let (handle, executor) = channel::<u32, ()>();
        let mut state = 0;
        assert_eq!(executor.drain_and_execute_one_pending(&mut state), Ok(false));

        let caller = {
            let handle = handle.clone();
            thread::spawn(move || handle.run_sync(|n| *n += 1))
        };
        // Poll like an event loop would between its own steps.
        let mut ran = false;
        while !ran {
            ran = executor.drain_and_execute_one_pending(&mut state).unwrap();
            if !ran {
                thread::sleep(Duration::from_millis(1));
            }
        }
        assert_eq!(caller.join().unwrap(), Ok(()));
        assert_eq!(state, 1);
        assert_eq!(executor.drain_and_execute_one_pending(&mut state), Ok(false));
    }

    #[test]
    fn caller_sees_closed_when_owner_is_gone() {
        let (handle, executor) = channel::<u32, u32>();
        drop(executor);
        assert_eq!(handle.run_sync(|n| *n), Err(BridgeError::Closed));
    }

    #[test]
    fn owner_sees_closed_when_callers_are_gone() {
        let (handle, executor) = channel::<u32, u32>();
        drop(handle);
        let mut state = 0;
        assert_eq!(
            executor.drain_and_execute_one_pending(&mut state),
            Err(BridgeError::Closed)
        );
        assert_eq!(
            executor.wait_and_execute(&mut state, Duration::from_millis(1)),
            Err(BridgeError::Closed)
        );
    }
}
