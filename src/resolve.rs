//! Mapping caller-supplied references to clients and workspaces.
//!
//! A reference is either an integer or a string.  Integers are client ids
//! (or workspace indices); strings match display names by case-sensitive
//! substring, taking the first hit in the window manager's canonical order.
//! Finding nothing is a normal outcome and is reported as `None`.

use crate::command::Value;
use crate::geometry::Rect;
use crate::traits::{ClientInfo, WindowId, WindowManager, WorkspaceInfo};
use log::warn;
use std::fmt;

/// A loosely-typed reference to a client or workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    Id(i64),
    Name(String),
}

impl EntityRef {
    /// Interpret a command argument.  Only ints and strings qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(EntityRef::Id(*n)),
            Value::Str(s) => Some(EntityRef::Name(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Id(n) => write!(f, "{:#x}", n),
            EntityRef::Name(s) => write!(f, "{:?}", s),
        }
    }
}

fn first_match<'a, T>(items: &'a [T], name: impl Fn(&T) -> &str, needle: &str) -> Option<&'a T> {
    items.iter().find(|item| name(item).contains(needle))
}

/// Find a live client by id or name fragment.
pub fn resolve_client<W: WindowManager>(wm: &W, reference: &EntityRef) -> Option<ClientInfo> {
    let clients = match wm.clients() {
        Ok(clients) => clients,
        Err(e) => {
            warn!("could not enumerate clients: {}", e);
            return None;
        }
    };
    match reference {
        EntityRef::Id(id) => {
            let id = WindowId::try_from(*id).ok()?;
            clients.into_iter().find(|c| c.id == id)
        }
        EntityRef::Name(needle) => first_match(&clients, |c| c.name.as_str(), needle).cloned(),
    }
}

/// Resolve the target of a tag operation.
///
/// The integer `0` always means the root window, even if a client with id
/// `0` exists.  Anything else resolves like [`resolve_client`].
pub fn resolve_tag_target<W: WindowManager>(wm: &W, reference: &EntityRef) -> Option<WindowId> {
    match reference {
        EntityRef::Id(0) => Some(wm.root()),
        other => resolve_client(wm, other).map(|c| c.id),
    }
}

/// Find a workspace by index (starting at 0) or name fragment.
pub fn resolve_workspace<W: WindowManager>(wm: &W, reference: &EntityRef) -> Option<WorkspaceInfo> {
    let workspaces = match wm.workspaces() {
        Ok(workspaces) => workspaces,
        Err(e) => {
            warn!("could not enumerate workspaces: {}", e);
            return None;
        }
    };
    match reference {
        EntityRef::Id(index) => {
            let index = usize::try_from(*index).ok()?;
            workspaces.into_iter().find(|w| w.index == index)
        }
        EntityRef::Name(needle) => first_match(&workspaces, |w| w.name.as_str(), needle).cloned(),
    }
}

/// The visible workspace that contains the point `(x, y)`.
///
/// When heads overlap, the workspace with the largest overlap wins; ties go
/// to the earlier workspace.
pub fn workspace_at<W: WindowManager>(wm: &W, x: i32, y: i32) -> Option<WorkspaceInfo> {
    let probe = Rect::new(x, y, 1, 1);
    let workspaces = match wm.workspaces() {
        Ok(workspaces) => workspaces,
        Err(e) => {
            warn!("could not enumerate workspaces: {}", e);
            return None;
        }
    };
    let mut best: Option<(u64, WorkspaceInfo)> = None;
    for ws in workspaces.into_iter().filter(|w| w.visible) {
        let area = ws.geom.overlap(&probe);
        if area > 0 && best.as_ref().map_or(true, |(a, _)| area > *a) {
            best = Some((area, ws));
        }
    }
    best.map(|(_, ws)| ws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessWm;

    fn wm() -> (HeadlessWm, Vec<WindowId>) {
        let mut wm = HeadlessWm::default();
        let ids = vec![
            wm.add_client("term-1", 0),
            wm.add_client("term-2", 0),
            wm.add_client("editor", 1),
        ];
        (wm, ids)
    }

    fn name(r: &str) -> EntityRef {
        EntityRef::Name(r.into())
    }

    #[test]
    fn substring_takes_first_in_canonical_order() {
        let (wm, ids) = wm();
        for _ in 0..3 {
            let c = resolve_client(&wm, &name("term")).unwrap();
            assert_eq!(c.name, "term-1");
            assert_eq!(c.id, ids[0]);
        }
    }

    #[test]
    fn no_match_is_absent() {
        let (wm, _) = wm();
        assert!(resolve_client(&wm, &name("nope")).is_none());
        assert!(resolve_client(&wm, &name("nope")).is_none());
    }

    #[test]
    fn match_is_case_sensitive() {
        let (wm, _) = wm();
        assert!(resolve_client(&wm, &name("Editor")).is_none());
        assert_eq!(resolve_client(&wm, &name("dit")).unwrap().name, "editor");
    }

    #[test]
    fn id_lookup() {
        let (wm, ids) = wm();
        let c = resolve_client(&wm, &EntityRef::Id(i64::from(ids[1]))).unwrap();
        assert_eq!(c.name, "term-2");
        assert!(resolve_client(&wm, &EntityRef::Id(12345)).is_none());
        assert!(resolve_client(&wm, &EntityRef::Id(-1)).is_none());
    }

    #[test]
    fn zero_is_root_for_tags() {
        let (mut wm, _) = wm();
        wm.add_client_with_id(0, "zero", 0);
        assert_eq!(resolve_client(&wm, &EntityRef::Id(0)).unwrap().name, "zero");
        assert_eq!(resolve_tag_target(&wm, &EntityRef::Id(0)), Some(wm.root()));
    }

    #[test]
    fn tag_target_falls_through_to_clients() {
        let (wm, ids) = wm();
        assert_eq!(resolve_tag_target(&wm, &name("editor")), Some(ids[2]));
        assert_eq!(resolve_tag_target(&wm, &name("nope")), None);
    }

    #[test]
    fn workspace_by_index_and_name() {
        let (wm, _) = wm();
        assert_eq!(resolve_workspace(&wm, &EntityRef::Id(2)).unwrap().name, "3");
        assert_eq!(resolve_workspace(&wm, &name("4")).unwrap().index, 3);
        assert!(resolve_workspace(&wm, &EntityRef::Id(4)).is_none());
        assert!(resolve_workspace(&wm, &EntityRef::Id(-1)).is_none());
        assert!(resolve_workspace(&wm, &name("x")).is_none());
    }

    #[test]
    fn entity_ref_from_value() {
        assert_eq!(EntityRef::from_value(&Value::Int(3)), Some(EntityRef::Id(3)));
        assert_eq!(EntityRef::from_value(&Value::from("a")), Some(name("a")));
        assert_eq!(EntityRef::from_value(&Value::Float(0.5)), None);
    }

    #[test]
    fn point_on_screen_finds_visible_workspace() {
        let (wm, _) = wm();
        assert_eq!(workspace_at(&wm, 10, 10).unwrap().index, 0);
        assert!(workspace_at(&wm, -5, 10).is_none());
        assert!(workspace_at(&wm, 1920, 0).is_none());
    }
}
