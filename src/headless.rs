//! In-memory [`WindowManager`] with no display server behind it.
//!
//! `HeadlessWm` keeps clients, workspaces, focus, the pointer and window
//! properties in plain data structures.  The daemon uses it when no display
//! backend is available, and the tests use it as a deterministic collaborator.
//!
//! Workspaces all share one head: exactly one of them is visible at a time
//! and it is always the current one.

use crate::config::HeadlessConfig;
use crate::geometry::Rect;
use crate::traits::{
    ClientFlag, ClientInfo, ClientState, Frame, WindowId, WindowManager, WorkspaceInfo,
};
use log::debug;
use std::collections::HashMap;

const ROOT: WindowId = 0x100;
const FIRST_CLIENT: WindowId = 0x200_0001;

/// Errors reported by the headless backend.
#[derive(Debug, thiserror::Error)]
pub enum HeadlessError {
    #[error("no such window: {0:#x}")]
    NoSuchWindow(WindowId),
    #[error("no such workspace: {0}")]
    NoSuchWorkspace(usize),
}

/// Mutable per-client state.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessClient {
    pub id: WindowId,
    pub name: String,
    pub workspace: Option<usize>,
    pub geom: Rect,
    pub frame: Frame,
    pub floating: bool,
    pub maximized: bool,
    pub above: bool,
    pub below: bool,
    pub sticky: bool,
    pub skip_taskbar: bool,
    pub skip_pager: bool,
    /// Geometry to restore on unmaximize.
    restore: Option<Rect>,
}

/// In-memory window manager.
#[derive(Debug)]
pub struct HeadlessWm {
    screen: Rect,
    workspaces: Vec<String>,
    current: usize,
    /// Clients in canonical (creation) order.
    clients: Vec<HeadlessClient>,
    /// Bottom to top.
    stack: Vec<WindowId>,
    focused: Option<WindowId>,
    pointer: (i32, i32),
    properties: HashMap<(WindowId, String), String>,
    next_id: WindowId,
    event_steps: u64,
}

impl Default for HeadlessWm {
    fn default() -> Self {
        Self::from_config(&HeadlessConfig::default())
    }
}

impl HeadlessWm {
    /// Create a backend with the workspaces, screen size and initial
    /// clients described by `config`.  Initial clients land on the first
    /// workspace.
    pub fn from_config(config: &HeadlessConfig) -> Self {
        let mut workspaces = config.workspaces.clone();
        if workspaces.is_empty() {
            workspaces.push("1".into());
        }
        let mut wm = Self {
            screen: Rect::new(0, 0, config.width, config.height),
            workspaces,
            current: 0,
            clients: Vec::new(),
            stack: Vec::new(),
            focused: None,
            pointer: (0, 0),
            properties: HashMap::new(),
            next_id: FIRST_CLIENT,
            event_steps: 0,
        };
        for name in &config.clients {
            wm.add_client(name, 0);
        }
        wm
    }

    /// Map a new client on `workspace` and return its id.
    pub fn add_client(&mut self, name: &str, workspace: usize) -> WindowId {
        let id = self.next_id;
        self.next_id += 1;
        let w = self.screen.width / 2;
        let h = self.screen.height / 2;
        self.clients.push(HeadlessClient {
            id,
            name: name.to_string(),
            workspace: Some(workspace.min(self.workspaces.len() - 1)),
            geom: Rect::new(self.screen.x, self.screen.y, w, h),
            frame: Frame::Decor,
            floating: false,
            maximized: false,
            above: false,
            below: false,
            sticky: false,
            skip_taskbar: false,
            skip_pager: false,
            restore: None,
        });
        self.stack.push(id);
        debug!("mapped client {:#x} ({})", id, name);
        id
    }

    /// Map a client with a caller-chosen id.
    #[cfg(test)]
    pub(crate) fn add_client_with_id(&mut self, id: WindowId, name: &str, workspace: usize) {
        let next = self.next_id;
        self.next_id = id;
        self.add_client(name, workspace);
        self.next_id = next;
    }

    /// Look up a client's full state.
    pub fn client(&self, id: WindowId) -> Option<&HeadlessClient> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Client ids from bottom to top of the stack.
    pub fn stacking_order(&self) -> &[WindowId] {
        &self.stack
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn pointer(&self) -> (i32, i32) {
        self.pointer
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Number of times [`WindowManager::process_events`] has run.
    pub fn event_steps(&self) -> u64 {
        self.event_steps
    }

    fn client_mut(&mut self, id: WindowId) -> Result<&mut HeadlessClient, HeadlessError> {
        self.clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(HeadlessError::NoSuchWindow(id))
    }

    fn check_window(&self, id: WindowId) -> Result<(), HeadlessError> {
        if id == ROOT || self.client(id).is_some() {
            Ok(())
        } else {
            Err(HeadlessError::NoSuchWindow(id))
        }
    }

    fn check_workspace(&self, index: usize) -> Result<(), HeadlessError> {
        if index < self.workspaces.len() {
            Ok(())
        } else {
            Err(HeadlessError::NoSuchWorkspace(index))
        }
    }

    fn is_shown(&self, client: &HeadlessClient) -> bool {
        client.sticky || client.workspace == Some(self.current)
    }
}

impl WindowManager for HeadlessWm {
    type Error = HeadlessError;

    fn clients(&self) -> Result<Vec<ClientInfo>, HeadlessError> {
        Ok(self
            .clients
            .iter()
            .map(|c| ClientInfo {
                id: c.id,
                name: c.name.clone(),
                workspace: if c.sticky { None } else { c.workspace },
                geom: c.geom,
            })
            .collect())
    }

    fn workspaces(&self) -> Result<Vec<WorkspaceInfo>, HeadlessError> {
        Ok(self
            .workspaces
            .iter()
            .enumerate()
            .map(|(index, name)| WorkspaceInfo {
                index,
                name: name.clone(),
                geom: self.screen,
                visible: index == self.current,
            })
            .collect())
    }

    fn current_workspace(&self) -> Result<WorkspaceInfo, HeadlessError> {
        Ok(WorkspaceInfo {
            index: self.current,
            name: self.workspaces[self.current].clone(),
            geom: self.screen,
            visible: true,
        })
    }

    fn active_client(&self) -> Result<Option<WindowId>, HeadlessError> {
        Ok(self.focused)
    }

    fn root(&self) -> WindowId {
        ROOT
    }

    fn pointer_position(&self) -> Result<(i32, i32), HeadlessError> {
        Ok(self.pointer)
    }

    fn client_states(&self, client: WindowId) -> Result<Vec<ClientState>, HeadlessError> {
        let c = self
            .client(client)
            .ok_or(HeadlessError::NoSuchWindow(client))?;
        let states = [
            (c.floating, ClientState::Floating),
            (c.maximized, ClientState::Maximized),
            (c.above, ClientState::StackAbove),
            (c.below, ClientState::StackBelow),
            (c.sticky, ClientState::Sticky),
        ];
        Ok(states
            .into_iter()
            .filter_map(|(on, state)| on.then_some(state))
            .collect())
    }

    fn get_property(&self, window: WindowId, key: &str) -> Result<Option<String>, HeadlessError> {
        self.check_window(window)?;
        Ok(self.properties.get(&(window, key.to_string())).cloned())
    }

    fn process_events(&mut self) -> Result<(), HeadlessError> {
        self.event_steps += 1;
        Ok(())
    }

    fn close(&mut self, client: WindowId) -> Result<(), HeadlessError> {
        self.client_mut(client)?;
        self.clients.retain(|c| c.id != client);
        self.stack.retain(|&id| id != client);
        self.properties.retain(|(w, _), _| *w != client);
        if self.focused == Some(client) {
            self.focused = None;
        }
        Ok(())
    }

    fn focus(&mut self, client: WindowId) -> Result<(), HeadlessError> {
        self.client_mut(client)?;
        self.focused = Some(client);
        Ok(())
    }

    fn focus_root(&mut self) -> Result<(), HeadlessError> {
        self.focused = None;
        Ok(())
    }

    fn focus_fallback(&mut self) -> Result<(), HeadlessError> {
        self.focused = self
            .stack
            .iter()
            .rev()
            .filter_map(|&id| self.client(id))
            .find(|c| self.is_shown(c))
            .map(|c| c.id);
        Ok(())
    }

    fn raise(&mut self, client: WindowId) -> Result<(), HeadlessError> {
        self.client_mut(client)?;
        self.stack.retain(|&id| id != client);
        self.stack.push(client);
        Ok(())
    }

    fn set_frame(&mut self, client: WindowId, frame: Frame) -> Result<(), HeadlessError> {
        self.client_mut(client)?.frame = frame;
        Ok(())
    }

    fn toggle_state(&mut self, client: WindowId, state: ClientState) -> Result<(), HeadlessError> {
        let maximized = self.client_mut(client)?.maximized;
        match state {
            ClientState::Maximized if maximized => return self.unmaximize(client),
            ClientState::Maximized => return self.maximize(client),
            _ => {}
        }
        let c = self.client_mut(client)?;
        match state {
            ClientState::Floating => c.floating = !c.floating,
            ClientState::StackAbove => {
                c.above = !c.above;
                c.below = false;
            }
            ClientState::StackBelow => {
                c.below = !c.below;
                c.above = false;
            }
            ClientState::Sticky => c.sticky = !c.sticky,
            ClientState::Maximized => {}
        }
        Ok(())
    }

    fn maximize(&mut self, client: WindowId) -> Result<(), HeadlessError> {
        let screen = self.screen;
        let c = self.client_mut(client)?;
        if !c.maximized {
            c.restore = Some(c.geom);
            c.geom = screen;
            c.maximized = true;
        }
        Ok(())
    }

    fn unmaximize(&mut self, client: WindowId) -> Result<(), HeadlessError> {
        let c = self.client_mut(client)?;
        if c.maximized {
            if let Some(geom) = c.restore.take() {
                c.geom = geom;
            }
            c.maximized = false;
        }
        Ok(())
    }

    fn move_client(&mut self, client: WindowId, x: i32, y: i32) -> Result<(), HeadlessError> {
        let c = self.client_mut(client)?;
        c.geom.x = x;
        c.geom.y = y;
        Ok(())
    }

    fn resize_client(
        &mut self,
        client: WindowId,
        width: i32,
        height: i32,
    ) -> Result<(), HeadlessError> {
        let c = self.client_mut(client)?;
        c.geom.width = width.max(1) as u32;
        c.geom.height = height.max(1) as u32;
        Ok(())
    }

    fn set_flag(
        &mut self,
        client: WindowId,
        flag: ClientFlag,
        on: bool,
    ) -> Result<(), HeadlessError> {
        let c = self.client_mut(client)?;
        match flag {
            ClientFlag::SkipTaskbar => c.skip_taskbar = on,
            ClientFlag::SkipPager => c.skip_pager = on,
        }
        Ok(())
    }

    fn warp_pointer(&mut self, x: i32, y: i32) -> Result<(), HeadlessError> {
        self.pointer = (x, y);
        Ok(())
    }

    fn set_workspace(&mut self, index: usize) -> Result<(), HeadlessError> {
        self.check_workspace(index)?;
        self.current = index;
        Ok(())
    }

    fn send_to_workspace(&mut self, client: WindowId, index: usize) -> Result<(), HeadlessError> {
        self.check_workspace(index)?;
        self.client_mut(client)?.workspace = Some(index);
        Ok(())
    }

    fn set_property(
        &mut self,
        window: WindowId,
        key: &str,
        value: &str,
    ) -> Result<(), HeadlessError> {
        self.check_window(window)?;
        self.properties
            .insert((window, key.to_string()), value.to_string());
        Ok(())
    }
}
