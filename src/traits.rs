//! Core traits that decouple wmbridge from any specific window manager or
//! transport mechanism.
//!
//! Every concrete backend (an X11 connection, the in-memory
//! [`HeadlessWm`](crate::headless::HeadlessWm), a test double, …) implements
//! [`WindowManager`]; every transport that delivers requests implements
//! [`CommandSource`].  Command handlers only depend on these abstractions.

use crate::dispatch::Dispatcher;
use crate::geometry::Rect;

/// Stable window identifier.
pub type WindowId = u32;

/// A live client window as reported by the window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub id: WindowId,
    /// Display name (usually the window title).
    pub name: String,
    /// Index of the workspace the client lives on, `None` if sticky or
    /// unmanaged.
    pub workspace: Option<usize>,
    pub geom: Rect,
}

/// A workspace as reported by the window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceInfo {
    /// Position in [`WindowManager::workspaces`], starting at 0.
    pub index: usize,
    pub name: String,
    /// Geometry of the head the workspace is shown on.
    pub geom: Rect,
    /// Whether the workspace is currently shown on some head.
    pub visible: bool,
}

/// Frame style of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Full decorations.
    Decor,
    /// No decorations at all.
    Nada,
}

/// Client states that can be toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Floating,
    Maximized,
    StackAbove,
    StackBelow,
    Sticky,
}

impl std::fmt::Display for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ClientState::Floating => "Floating",
            ClientState::Maximized => "Maximized",
            ClientState::StackAbove => "StackAbove",
            ClientState::StackBelow => "StackBelow",
            ClientState::Sticky => "Sticky",
        };
        f.write_str(name)
    }
}

/// Boolean hints that panels and pagers read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientFlag {
    SkipTaskbar,
    SkipPager,
}

/// Abstraction over the window manager's object model.
///
/// Implementations are owned by a single thread (the event loop).  All
/// methods are called from that thread only, through the
/// [`bridge`](crate::bridge); implementations need no internal locking.
///
/// Enumeration methods return entities in a canonical, stable order.  Name
/// lookups pick the first match in that order, so the order must not change
/// between two calls unless the set of entities does.
pub trait WindowManager {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    //  Queries

    /// All live clients, in canonical order.
    fn clients(&self) -> Result<Vec<ClientInfo>, Self::Error>;

    /// All workspaces, in index order.
    fn workspaces(&self) -> Result<Vec<WorkspaceInfo>, Self::Error>;

    /// The workspace that currently has focus.
    fn current_workspace(&self) -> Result<WorkspaceInfo, Self::Error>;

    /// The focused client, if any.
    fn active_client(&self) -> Result<Option<WindowId>, Self::Error>;

    /// Id of the root (background) window.
    fn root(&self) -> WindowId;

    /// Pointer position in root coordinates.
    fn pointer_position(&self) -> Result<(i32, i32), Self::Error>;

    /// The toggleable states currently set on `client`.
    fn client_states(&self, client: WindowId) -> Result<Vec<ClientState>, Self::Error>;

    /// Read a string property.  `Ok(None)` if the property is not set.
    fn get_property(&self, window: WindowId, key: &str) -> Result<Option<String>, Self::Error>;

    //  Event loop

    /// Process whatever native events are pending.
    ///
    /// Called by [`Session::run`](crate::session::Session::run) between
    /// bridged commands.
    fn process_events(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    //  Mutations

    fn close(&mut self, client: WindowId) -> Result<(), Self::Error>;

    fn focus(&mut self, client: WindowId) -> Result<(), Self::Error>;

    /// Give focus to the root window.
    fn focus_root(&mut self) -> Result<(), Self::Error>;

    /// Focus whatever client should have focus on the current workspace.
    fn focus_fallback(&mut self) -> Result<(), Self::Error>;

    fn raise(&mut self, client: WindowId) -> Result<(), Self::Error>;

    /// Release a grabbed pointer event so the client under the pointer
    /// receives it.
    fn replay_pointer(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_frame(&mut self, client: WindowId, frame: Frame) -> Result<(), Self::Error>;

    fn toggle_state(&mut self, client: WindowId, state: ClientState) -> Result<(), Self::Error>;

    fn maximize(&mut self, client: WindowId) -> Result<(), Self::Error>;

    /// Restore a maximized client.  A no-op for clients that are not
    /// maximized.
    fn unmaximize(&mut self, client: WindowId) -> Result<(), Self::Error>;

    fn move_client(&mut self, client: WindowId, x: i32, y: i32) -> Result<(), Self::Error>;

    fn resize_client(&mut self, client: WindowId, width: i32, height: i32)
        -> Result<(), Self::Error>;

    fn set_flag(&mut self, client: WindowId, flag: ClientFlag, on: bool)
        -> Result<(), Self::Error>;

    fn warp_pointer(&mut self, x: i32, y: i32) -> Result<(), Self::Error>;

    /// Show the workspace at `index` and make it current.
    fn set_workspace(&mut self, index: usize) -> Result<(), Self::Error>;

    /// Move `client` onto the workspace at `index`.
    fn send_to_workspace(&mut self, client: WindowId, index: usize) -> Result<(), Self::Error>;

    fn set_property(&mut self, window: WindowId, key: &str, value: &str)
        -> Result<(), Self::Error>;
}

//  Command Source

/// A transport that delivers commands.
///
/// Implementations listen on some transport (a Unix socket, a keybinding
/// daemon, …) and execute each request through the provided
/// [`Dispatcher`], which blocks until the owning event loop has run it.
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Implementations may dispatch from as many threads as they like; the
///   dispatcher serializes execution.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and dispatch every incoming command.
    fn run<W: WindowManager + 'static>(&mut self, dispatcher: Dispatcher<W>)
        -> Result<(), Self::Error>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! A test double that records every mutation made through it.

    use super::*;
    use std::cell::RefCell;

    /// Reports one client (`7`, "mock") on one visible workspace spanning
    /// `0,0 1920x1080`.  The pointer query fails unless `pointer` is set.
    #[derive(Debug, Default)]
    pub struct RecorderWm {
        pub log: RefCell<Vec<String>>,
        pub pointer: Option<(i32, i32)>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("mock error")]
    pub struct MockError;

    impl RecorderWm {
        fn record(&self, entry: String) -> Result<(), MockError> {
            self.log.borrow_mut().push(entry);
            Ok(())
        }

        pub fn entries(&self) -> Vec<String> {
            self.log.borrow().clone()
        }
    }

    impl WindowManager for RecorderWm {
        type Error = MockError;

        fn clients(&self) -> Result<Vec<ClientInfo>, MockError> {
            Ok(vec![ClientInfo {
                id: 7,
                name: "mock".into(),
                workspace: Some(0),
                geom: Rect::new(0, 0, 10, 10),
            }])
        }

        fn workspaces(&self) -> Result<Vec<WorkspaceInfo>, MockError> {
            Ok(vec![self.current_workspace()?])
        }

        fn current_workspace(&self) -> Result<WorkspaceInfo, MockError> {
            Ok(WorkspaceInfo {
                index: 0,
                name: "main".into(),
                geom: Rect::new(0, 0, 1920, 1080),
                visible: true,
            })
        }

        fn active_client(&self) -> Result<Option<WindowId>, MockError> {
            Ok(None)
        }

        fn root(&self) -> WindowId {
            1
        }

        fn pointer_position(&self) -> Result<(i32, i32), MockError> {
            self.pointer.ok_or(MockError)
        }

        fn client_states(&self, _: WindowId) -> Result<Vec<ClientState>, MockError> {
            Ok(vec![ClientState::Floating])
        }

        fn get_property(&self, _: WindowId, _: &str) -> Result<Option<String>, MockError> {
            Ok(None)
        }

        fn close(&mut self, c: WindowId) -> Result<(), MockError> {
            self.record(format!("close {}", c))
        }

        fn focus(&mut self, c: WindowId) -> Result<(), MockError> {
            self.record(format!("focus {}", c))
        }

        fn focus_root(&mut self) -> Result<(), MockError> {
            self.record("focus root".into())
        }

        fn focus_fallback(&mut self) -> Result<(), MockError> {
            self.record("focus fallback".into())
        }

        fn raise(&mut self, c: WindowId) -> Result<(), MockError> {
            self.record(format!("raise {}", c))
        }

        fn set_frame(&mut self, c: WindowId, f: Frame) -> Result<(), MockError> {
            self.record(format!("frame {} {:?}", c, f))
        }

        fn toggle_state(&mut self, c: WindowId, s: ClientState) -> Result<(), MockError> {
            self.record(format!("toggle {} {:?}", c, s))
        }

        fn maximize(&mut self, c: WindowId) -> Result<(), MockError> {
            self.record(format!("maximize {}", c))
        }

        fn unmaximize(&mut self, c: WindowId) -> Result<(), MockError> {
            self.record(format!("unmaximize {}", c))
        }

        fn move_client(&mut self, c: WindowId, x: i32, y: i32) -> Result<(), MockError> {
            self.record(format!("move {} {} {}", c, x, y))
        }

        fn resize_client(&mut self, c: WindowId, w: i32, h: i32) -> Result<(), MockError> {
            self.record(format!("resize {} {} {}", c, w, h))
        }

        fn set_flag(&mut self, c: WindowId, f: ClientFlag, on: bool) -> Result<(), MockError> {
            self.record(format!("flag {} {:?} {}", c, f, on))
        }

        fn warp_pointer(&mut self, x: i32, y: i32) -> Result<(), MockError> {
            self.record(format!("warp {} {}", x, y))
        }

        fn set_workspace(&mut self, i: usize) -> Result<(), MockError> {
            self.record(format!("workspace {}", i))
        }

        fn send_to_workspace(&mut self, c: WindowId, i: usize) -> Result<(), MockError> {
            self.record(format!("send {} {}", c, i))
        }

        fn set_property(&mut self, w: WindowId, k: &str, v: &str) -> Result<(), MockError> {
            self.record(format!("prop {} {}={}", w, k, v))
        }
    }
}
