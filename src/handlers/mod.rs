//! Command handlers and the built-in catalog.
//!
//! Every handler follows the same shape: check argument constraints that
//! do not need the window manager, resolve entities, then call the
//! [`WindowManager`].  A reference that matches nothing makes the command a
//! no-op rather than an error.
//!
//! Handlers run on the thread that owns the [`Session`]; they never lock
//! anything themselves.

mod client;
mod lifecycle;
mod pointer;
mod query;
mod tag;
mod workspace;

pub use tag::{tag_property, valid_tag_name};

use crate::command::{CommandError, Value, ValueKind};
use crate::registry::{CommandSpec, Invocation, Outcome, ParamSpec, Registry, RegistryError};
use crate::resolve;
use crate::session::Session;
use crate::traits::{ClientInfo, WindowManager};
use log::debug;
use std::fmt;

const ENTITY: &[ValueKind] = &[ValueKind::Int, ValueKind::Str];
const GEOMETRY: &[ValueKind] = &[ValueKind::Int, ValueKind::Float];
const INT: &[ValueKind] = &[ValueKind::Int];
const STRING: &[ValueKind] = &[ValueKind::Str];

const CLIENT: ParamSpec = ParamSpec::new("Client", ENTITY);
const WORKSPACE: ParamSpec = ParamSpec::new("Workspace", ENTITY);

/// Build the registry of every built-in command.
pub fn catalog<W: WindowManager>() -> Result<Registry<W>, RegistryError> {
    let mut registry = Registry::new();
    let specs = client::specs::<W>()
        .into_iter()
        .chain(pointer::specs::<W>())
        .chain(workspace::specs::<W>())
        .chain(tag::specs::<W>())
        .chain(query::specs::<W>())
        .chain(lifecycle::specs::<W>());
    for spec in specs {
        registry.register(spec)?;
    }
    Ok(registry)
}

/// Shorthand for a client-only command spec.
fn client_command<W: WindowManager>(
    name: &'static str,
    help: &'static str,
    handler: fn(&mut Session<W>, &Invocation) -> Outcome,
) -> CommandSpec<W> {
    CommandSpec {
        name,
        params: &[CLIENT],
        help,
        handler,
    }
}

/// Wrap a window manager failure.
fn collaborator<E: fmt::Display>(inv: &Invocation, e: E) -> CommandError {
    CommandError::Collaborator(format!("{}: {}", inv.name(), e))
}

/// Resolve argument `i` as a client, logging a miss.
fn client_arg<W: WindowManager>(
    session: &Session<W>,
    inv: &Invocation,
    i: usize,
) -> Result<Option<ClientInfo>, CommandError> {
    let reference = inv.entity(i)?;
    let client = resolve::resolve_client(&session.wm, &reference);
    if client.is_none() {
        debug!("{}: no client matches {}", inv.name(), reference);
    }
    Ok(client)
}

/// Run `f` against the client named by the first argument.  No match is a
/// no-op.
fn with_client<W, F>(session: &mut Session<W>, inv: &Invocation, f: F) -> Outcome
where
    W: WindowManager,
    F: FnOnce(&mut W, &ClientInfo) -> Result<(), W::Error>,
{
    if let Some(client) = client_arg(session, inv, 0)? {
        f(&mut session.wm, &client).map_err(|e| collaborator(inv, e))?;
    }
    Ok(Value::Nil)
}
