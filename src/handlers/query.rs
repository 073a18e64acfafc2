//! Read-only queries.  A reference that matches nothing yields `""` or `0`,
//! except `GetWorkspaceId`, which yields `-1` because `0` is a valid index.

use super::{client_arg, client_command, collaborator, STRING, WORKSPACE};
use crate::command::{CommandError, Value};
use crate::registry::{CommandSpec, Invocation, Outcome, ParamSpec};
use crate::resolve::resolve_workspace;
use crate::session::Session;
use crate::traits::{ClientInfo, WindowManager, WorkspaceInfo};

const PREFIX: ParamSpec = ParamSpec::new("Prefix", STRING);

pub(super) fn specs<W: WindowManager>() -> Vec<CommandSpec<W>> {
    vec![
        CommandSpec {
            name: "GetActive",
            params: &[],
            help: "Returns the id of the currently focused window, or 0 if no window \
                   has focus.",
            handler: get_active,
        },
        client_command(
            "GetClientName",
            "Returns the name of the window specified by Client.",
            |s, inv| query_client(s, inv, Value::from(""), |_, c| Value::Str(c.name.clone())),
        ),
        client_command(
            "GetClientX",
            "Returns the x position of the window specified by Client, in pixels \
             relative to the screen.",
            |s, inv| query_client(s, inv, Value::Int(0), |_, c| Value::Int(i64::from(c.geom.x))),
        ),
        client_command(
            "GetClientY",
            "Returns the y position of the window specified by Client, in pixels \
             relative to the screen.",
            |s, inv| query_client(s, inv, Value::Int(0), |_, c| Value::Int(i64::from(c.geom.y))),
        ),
        client_command(
            "GetClientWidth",
            "Returns the width of the window specified by Client, in pixels.",
            |s, inv| {
                query_client(s, inv, Value::Int(0), |_, c| Value::Int(i64::from(c.geom.width)))
            },
        ),
        client_command(
            "GetClientHeight",
            "Returns the height of the window specified by Client, in pixels.",
            |s, inv| {
                query_client(s, inv, Value::Int(0), |_, c| Value::Int(i64::from(c.geom.height)))
            },
        ),
        client_command(
            "GetClientWorkspace",
            "Returns the name of the workspace the window specified by Client is on. \
             Sticky windows are on no workspace and return an empty string.",
            |s, inv| query_client(s, inv, Value::from(""), client_workspace),
        ),
        client_command(
            "GetClientStatesList",
            "Returns a newline separated list of the states set on the window \
             specified by Client: Floating, Maximized, StackAbove, StackBelow or \
             Sticky.",
            get_client_states,
        ),
        CommandSpec {
            name: "GetAllClients",
            params: &[],
            help: "Returns a newline separated list of the ids of every managed \
                   window, in the order they were mapped.",
            handler: get_all_clients,
        },
        CommandSpec {
            name: "GetClientList",
            params: &[WORKSPACE],
            help: "Returns a newline separated list of the ids of all windows on the \
                   workspace specified by Workspace.\n\n\
                   Workspace may be a workspace index (starting at 0) or a substring \
                   that matches a workspace name.",
            handler: get_client_list,
        },
        CommandSpec {
            name: "GetWorkspace",
            params: &[],
            help: "Returns the name of the current workspace.",
            handler: get_workspace,
        },
        CommandSpec {
            name: "GetWorkspaceList",
            params: &[],
            help: "Returns a newline separated list of all workspace names.",
            handler: get_workspace_list,
        },
        CommandSpec {
            name: "GetWorkspaceId",
            params: &[WORKSPACE],
            help: "Returns the index of the workspace specified by Workspace, or -1 \
                   if no workspace matches.",
            handler: get_workspace_id,
        },
        CommandSpec {
            name: "GetWorkspaceNext",
            params: &[],
            help: "Returns the name of the workspace after the current one, wrapping \
                   around to the first.",
            handler: |s, inv| workspace_step(s, inv, 1),
        },
        CommandSpec {
            name: "GetWorkspacePrev",
            params: &[],
            help: "Returns the name of the workspace before the current one, wrapping \
                   around to the last.",
            handler: |s, inv| workspace_step(s, inv, -1),
        },
        CommandSpec {
            name: "GetWorkspacePrefix",
            params: &[PREFIX],
            help: "Returns the name of the first hidden workspace whose name starts \
                   with Prefix.  If the current workspace starts with Prefix, the \
                   search starts after it, so repeated calls cycle through the \
                   matching workspaces.  Returns an empty string if nothing matches.",
            handler: get_workspace_prefix,
        },
    ]
}

/// Apply `get` to the client named by the first argument, or return
/// `absent` if there is none.
fn query_client<W, F>(session: &Session<W>, inv: &Invocation, absent: Value, get: F) -> Outcome
where
    W: WindowManager,
    F: FnOnce(&W, &ClientInfo) -> Value,
{
    Ok(match client_arg(session, inv, 0)? {
        Some(c) => get(&session.wm, &c),
        None => absent,
    })
}

fn client_workspace<W: WindowManager>(wm: &W, c: &ClientInfo) -> Value {
    let name = c
        .workspace
        .and_then(|index| wm.workspaces().ok()?.into_iter().find(|ws| ws.index == index))
        .map(|ws| ws.name)
        .unwrap_or_default();
    Value::Str(name)
}

fn get_client_states<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let Some(c) = client_arg(session, inv, 0)? else {
        return Ok(Value::from(""));
    };
    let states: Vec<String> = session
        .wm
        .client_states(c.id)
        .map_err(|e| collaborator(inv, e))?
        .iter()
        .map(ToString::to_string)
        .collect();
    Ok(Value::Str(states.join("\n")))
}

fn get_all_clients<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let ids: Vec<String> = session
        .wm
        .clients()
        .map_err(|e| collaborator(inv, e))?
        .into_iter()
        .map(|c| c.id.to_string())
        .collect();
    Ok(Value::Str(ids.join("\n")))
}

fn get_active<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let active = session.wm.active_client().map_err(|e| collaborator(inv, e))?;
    Ok(Value::Int(active.map_or(0, i64::from)))
}

fn get_client_list<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let Some(ws) = resolve_workspace(&session.wm, &inv.entity(0)?) else {
        return Ok(Value::from(""));
    };
    let ids: Vec<String> = session
        .wm
        .clients()
        .map_err(|e| collaborator(inv, e))?
        .into_iter()
        .filter(|c| c.workspace == Some(ws.index))
        .map(|c| c.id.to_string())
        .collect();
    Ok(Value::Str(ids.join("\n")))
}

fn get_workspace<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let ws = session
        .wm
        .current_workspace()
        .map_err(|e| collaborator(inv, e))?;
    Ok(Value::Str(ws.name))
}

fn get_workspace_list<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let names: Vec<String> = session
        .wm
        .workspaces()
        .map_err(|e| collaborator(inv, e))?
        .into_iter()
        .map(|ws| ws.name)
        .collect();
    Ok(Value::Str(names.join("\n")))
}

fn get_workspace_id<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let index = resolve_workspace(&session.wm, &inv.entity(0)?)
        .and_then(|ws| i64::try_from(ws.index).ok());
    Ok(Value::Int(index.unwrap_or(-1)))
}

/// All workspaces plus the position of the current one among them.
fn workspaces_around_current<W: WindowManager>(
    session: &Session<W>,
    inv: &Invocation,
) -> Result<(Vec<WorkspaceInfo>, usize), CommandError> {
    let all = session.wm.workspaces().map_err(|e| collaborator(inv, e))?;
    let current = session
        .wm
        .current_workspace()
        .map_err(|e| collaborator(inv, e))?;
    let pos = all
        .iter()
        .position(|ws| ws.index == current.index)
        .unwrap_or(0);
    Ok((all, pos))
}

fn workspace_step<W: WindowManager>(
    session: &mut Session<W>,
    inv: &Invocation,
    step: isize,
) -> Outcome {
    let (all, pos) = workspaces_around_current(session, inv)?;
    if all.is_empty() {
        return Ok(Value::from(""));
    }
    let n = all.len() as isize;
    let next = (pos as isize + step).rem_euclid(n) as usize;
    Ok(Value::Str(all[next].name.clone()))
}

fn get_workspace_prefix<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let prefix = inv.string(0)?;
    let (all, pos) = workspaces_around_current(session, inv)?;
    let start = match all.get(pos) {
        Some(current) if current.name.starts_with(prefix) => pos + 1,
        _ => 0,
    };
    let n = all.len();
    let found = (0..n)
        .map(|k| (start + k) % n)
        .map(|i| (i, &all[i]))
        .find(|(i, ws)| ws.name.starts_with(prefix) && (!ws.visible || *i == pos));
    Ok(Value::Str(found.map(|(_, ws)| ws.name.clone()).unwrap_or_default()))
}
