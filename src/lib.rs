//! **wmbridge**: a thread-safe command bridge for a single-threaded window
//! manager.
//!
//! Window manager state may only be touched from the thread that runs the
//! display event loop.  wmbridge lets any number of other threads (socket
//! connections, scripts, key-binding helpers) issue named commands against
//! that state and wait for their results, without ever touching it
//! themselves.
//!
//! # Architecture
//!
//! * [`command`]: the value model and the text / JSON request forms.
//! * [`registry`] and [`handlers`]: the closed catalog of commands, their
//!   typed parameters and their implementations.
//! * [`bridge`]: the one-at-a-time handoff between caller threads and the
//!   owning thread.
//! * [`dispatch`]: validation, execution through the bridge, and the error
//!   policy for quiet and verbose callers.
//! * [`resolve`] and [`geometry`]: turning loosely typed arguments into
//!   concrete clients, workspaces and pixel positions.
//! * [`session`]: the state owned by the event loop, and the loop itself.
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::WindowManager`] abstracts the window manager's object model
//!   so handlers are not coupled to a specific display server.
//!   [`headless`] provides an in-memory implementation.
//! * [`traits::CommandSource`] abstracts the transport that delivers
//!   requests.  [`ipc`] provides a Unix-socket implementation.

pub mod bridge;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod geometry;
pub mod handlers;
pub mod headless;
pub mod ipc;
pub mod registry;
pub mod resolve;
pub mod session;
pub mod traits;
