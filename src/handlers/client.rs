//! Commands that act on a single client.

use super::{client_arg, client_command, collaborator, with_client, CLIENT, GEOMETRY};
use crate::command::{CommandError, Value};
use crate::geometry::parse_pair;
use crate::registry::{CommandSpec, Invocation, Outcome, ParamSpec};
use crate::session::Session;
use crate::traits::{ClientFlag, ClientState, Frame, WindowManager};
use log::warn;

const X: ParamSpec = ParamSpec::new("X", GEOMETRY);
const Y: ParamSpec = ParamSpec::new("Y", GEOMETRY);
const WIDTH: ParamSpec = ParamSpec::new("Width", GEOMETRY);
const HEIGHT: ParamSpec = ParamSpec::new("Height", GEOMETRY);

pub(super) fn specs<W: WindowManager>() -> Vec<CommandSpec<W>> {
    vec![
        client_command(
            "Close",
            "Closes the window specified by Client.\n\n\
             Client may be the window id or a substring that matches a window name.",
            close,
        ),
        client_command(
            "Focus",
            "Focuses the window specified by Client. If no window matches, the root \
             window is focused and the workspace under the pointer is activated.\n\n\
             Client may be the window id or a substring that matches a window name.",
            focus,
        ),
        client_command(
            "FocusRaise",
            "Focuses and raises the window specified by Client.\n\n\
             Client may be the window id or a substring that matches a window name.",
            focus_raise,
        ),
        client_command(
            "Raise",
            "Raises the window specified by Client to the top of its layer.\n\n\
             Client may be the window id or a substring that matches a window name.",
            raise,
        ),
        client_command(
            "FrameDecor",
            "Gives the window specified by Client full decorations.",
            |s, inv| with_client(s, inv, |wm, c| wm.set_frame(c.id, Frame::Decor)),
        ),
        client_command(
            "FrameNada",
            "Removes all decorations from the window specified by Client.",
            |s, inv| with_client(s, inv, |wm, c| wm.set_frame(c.id, Frame::Nada)),
        ),
        client_command(
            "ToggleFloating",
            "Toggles whether the window specified by Client is forced into the \
             floating layout. A window forced into the floating layout cannot be tiled.",
            |s, inv| with_client(s, inv, |wm, c| wm.toggle_state(c.id, ClientState::Floating)),
        ),
        client_command(
            "ToggleMaximize",
            "Maximizes or restores the window specified by Client.",
            |s, inv| with_client(s, inv, |wm, c| wm.toggle_state(c.id, ClientState::Maximized)),
        ),
        client_command(
            "ToggleStackAbove",
            "Toggles the window specified by Client between the normal and the \
             \"above\" layer. Windows in the above layer stay above normal windows.",
            |s, inv| with_client(s, inv, |wm, c| wm.toggle_state(c.id, ClientState::StackAbove)),
        ),
        client_command(
            "ToggleStackBelow",
            "Toggles the window specified by Client between the normal and the \
             \"below\" layer. Windows in the below layer stay below normal windows.",
            |s, inv| with_client(s, inv, |wm, c| wm.toggle_state(c.id, ClientState::StackBelow)),
        ),
        client_command(
            "ToggleSticky",
            "Toggles the sticky state of the window specified by Client. A sticky \
             window is visible on every workspace.",
            |s, inv| with_client(s, inv, |wm, c| wm.toggle_state(c.id, ClientState::Sticky)),
        ),
        client_command(
            "Maximize",
            "Maximizes the window specified by Client. No effect if it is already maximized.",
            |s, inv| with_client(s, inv, |wm, c| wm.maximize(c.id)),
        ),
        client_command(
            "Unmaximize",
            "Restores the window specified by Client. No effect if it is not maximized.",
            |s, inv| with_client(s, inv, |wm, c| wm.unmaximize(c.id)),
        ),
        client_command(
            "HideClientFromPanels",
            "Sets the flags that hide the window specified by Client from panels and pagers.",
            |s, inv| set_panel_flags(s, inv, true),
        ),
        client_command(
            "ShowClientInPanels",
            "Clears the flags that hide the window specified by Client from panels and pagers.",
            |s, inv| set_panel_flags(s, inv, false),
        ),
        CommandSpec {
            name: "Move",
            params: &[CLIENT, X, Y],
            help: "Moves the window specified by Client to the position X, Y. The origin \
                   is the top left corner of the screen.\n\n\
                   X and Y may be pixels (integers) or ratios in (0.0, 1.0] of the \
                   current workspace's geometry.",
            handler: move_client,
        },
        CommandSpec {
            name: "MoveRelative",
            params: &[CLIENT, X, Y],
            help: "Moves the window specified by Client to the position X, Y relative to \
                   the top left corner of the current workspace.\n\n\
                   X and Y may be pixels (integers) or ratios in (0.0, 1.0] of the \
                   current workspace's geometry.",
            handler: move_relative,
        },
        CommandSpec {
            name: "Resize",
            params: &[CLIENT, WIDTH, HEIGHT],
            help: "Resizes the window specified by Client to Width by Height.\n\n\
                   Width and Height may be pixels (integers) or ratios in (0.0, 1.0] of \
                   the current workspace's geometry.",
            handler: resize,
        },
    ]
}

fn close<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    with_client(session, inv, |wm, c| wm.close(c.id))
}

fn focus<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let Some(client) = client_arg(session, inv, 0)? else {
        return focus_nothing(session, inv);
    };
    let wm = &mut session.wm;
    wm.focus(client.id).map_err(|e| collaborator(inv, e))?;
    wm.replay_pointer().map_err(|e| collaborator(inv, e))?;
    Ok(Value::Nil)
}

/// Focus the root window and activate the workspace under the pointer, if
/// the pointer is over one.
fn focus_nothing<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let wm = &mut session.wm;
    wm.focus_root().map_err(|e| collaborator(inv, e))?;
    let (x, y) = match wm.pointer_position() {
        Ok(pos) => pos,
        Err(e) => {
            warn!("{}: could not query the pointer: {}", inv.name(), e);
            return Ok(Value::Nil);
        }
    };
    if let Some(ws) = crate::resolve::workspace_at(&*wm, x, y) {
        wm.set_workspace(ws.index).map_err(|e| collaborator(inv, e))?;
    }
    Ok(Value::Nil)
}

fn focus_raise<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    with_client(session, inv, |wm, c| {
        wm.focus(c.id)?;
        wm.raise(c.id)?;
        wm.replay_pointer()
    })
}

fn raise<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    with_client(session, inv, |wm, c| {
        wm.raise(c.id)?;
        wm.replay_pointer()
    })
}

fn set_panel_flags<W: WindowManager>(
    session: &mut Session<W>,
    inv: &Invocation,
    hide: bool,
) -> Outcome {
    with_client(session, inv, |wm, c| {
        wm.set_flag(c.id, ClientFlag::SkipTaskbar, hide)?;
        wm.set_flag(c.id, ClientFlag::SkipPager, hide)
    })
}

/// Parse arguments 1 and 2 against the current workspace.  Returns the pair
/// and the workspace origin.
fn geometry_args<W: WindowManager>(
    session: &Session<W>,
    inv: &Invocation,
) -> Result<((i32, i32), (i32, i32)), CommandError> {
    let geom = session
        .wm
        .current_workspace()
        .map_err(|e| collaborator(inv, e))?
        .geom;
    let (x, y) = (inv.arg(1)?, inv.arg(2)?);
    let pair = parse_pair(&geom, x, y).ok_or_else(|| {
        CommandError::Aborted(format!(
            "{}: values must be pixels or ratios in (0.0, 1.0], got {} and {}",
            inv.name(),
            x,
            y
        ))
    })?;
    Ok((pair, (geom.x, geom.y)))
}

fn move_client<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let ((x, y), _) = geometry_args(session, inv)?;
    with_client(session, inv, |wm, c| {
        wm.unmaximize(c.id)?;
        wm.move_client(c.id, x, y)
    })
}

fn move_relative<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let ((x, y), (ox, oy)) = geometry_args(session, inv)?;
    with_client(session, inv, |wm, c| {
        wm.unmaximize(c.id)?;
        wm.move_client(c.id, ox + x, oy + y)
    })
}

fn resize<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let ((w, h), _) = geometry_args(session, inv)?;
    with_client(session, inv, |wm, c| {
        wm.unmaximize(c.id)?;
        wm.resize_client(c.id, w, h)
    })
}
