//! Workspace switching.

use super::{client_arg, collaborator, CLIENT, WORKSPACE};
use crate::command::{CommandError, Value};
use crate::registry::{CommandSpec, Invocation, Outcome};
use crate::resolve::resolve_workspace;
use crate::session::Session;
use crate::traits::{WindowManager, WorkspaceInfo};
use log::debug;

pub(super) fn specs<W: WindowManager>() -> Vec<CommandSpec<W>> {
    vec![
        CommandSpec {
            name: "Workspace",
            params: &[WORKSPACE],
            help: "Sets the current workspace to the one specified by Workspace.\n\n\
                   Workspace may be a workspace index (starting at 0) or a substring \
                   that matches a workspace name.",
            handler: workspace,
        },
        CommandSpec {
            name: "WorkspaceSendClient",
            params: &[WORKSPACE, CLIENT],
            help: "Sends the window specified by Client to the workspace specified by \
                   Workspace.\n\n\
                   Workspace may be a workspace index (starting at 0) or a substring \
                   that matches a workspace name. Client may be the window id or a \
                   substring that matches a window name.",
            handler: send_client,
        },
        CommandSpec {
            name: "WorkspaceWithClient",
            params: &[WORKSPACE, CLIENT],
            help: "Sets the current workspace to the one specified by Workspace, and \
                   brings the window specified by Client along with it.\n\n\
                   Workspace may be a workspace index (starting at 0) or a substring \
                   that matches a workspace name. Client may be the window id or a \
                   substring that matches a window name.",
            handler: with_client,
        },
    ]
}

fn workspace_arg<W: WindowManager>(
    session: &Session<W>,
    inv: &Invocation,
) -> Result<Option<WorkspaceInfo>, CommandError> {
    let reference = inv.entity(0)?;
    let ws = resolve_workspace(&session.wm, &reference);
    if ws.is_none() {
        debug!("{}: no workspace matches {}", inv.name(), reference);
    }
    Ok(ws)
}

fn workspace<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let Some(ws) = workspace_arg(session, inv)? else {
        return Ok(Value::Nil);
    };
    let wm = &mut session.wm;
    wm.set_workspace(ws.index).map_err(|e| collaborator(inv, e))?;
    wm.focus_fallback().map_err(|e| collaborator(inv, e))?;
    Ok(Value::Nil)
}

fn send_client<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let Some(ws) = workspace_arg(session, inv)? else {
        return Ok(Value::Nil);
    };
    let Some(client) = client_arg(session, inv, 1)? else {
        return Ok(Value::Nil);
    };
    session
        .wm
        .send_to_workspace(client.id, ws.index)
        .map_err(|e| collaborator(inv, e))?;
    Ok(Value::Nil)
}

fn with_client<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let Some(ws) = workspace_arg(session, inv)? else {
        return Ok(Value::Nil);
    };
    let Some(client) = client_arg(session, inv, 1)? else {
        return Ok(Value::Nil);
    };
    let wm = &mut session.wm;
    wm.raise(client.id).map_err(|e| collaborator(inv, e))?;
    wm.send_to_workspace(client.id, ws.index)
        .map_err(|e| collaborator(inv, e))?;
    wm.set_workspace(ws.index).map_err(|e| collaborator(inv, e))?;
    wm.focus_fallback().map_err(|e| collaborator(inv, e))?;
    Ok(Value::Nil)
}
