//! Pointer commands.

use super::{collaborator, GEOMETRY, INT, STRING};
use crate::command::{CommandError, Value};
use crate::geometry::parse_pair;
use crate::registry::{CommandSpec, Invocation, Outcome, ParamSpec};
use crate::session::Session;
use crate::traits::WindowManager;
use log::warn;

const X: ParamSpec = ParamSpec::new("X", INT);
const Y: ParamSpec = ParamSpec::new("Y", INT);
const REL_X: ParamSpec = ParamSpec::new("X", GEOMETRY);
const REL_Y: ParamSpec = ParamSpec::new("Y", GEOMETRY);
const DIRECTION: ParamSpec = ParamSpec::new("Direction", STRING);

pub(super) fn specs<W: WindowManager>() -> Vec<CommandSpec<W>> {
    vec![
        CommandSpec {
            name: "MovePointer",
            params: &[X, Y],
            help: "Moves the pointer to the position X, Y, in pixels relative to the \
                   top left corner of the screen.",
            handler: move_pointer,
        },
        CommandSpec {
            name: "MovePointerRelative",
            params: &[REL_X, REL_Y],
            help: "Moves the pointer to the position X, Y relative to the top left \
                   corner of the current workspace.\n\n\
                   X and Y may be pixels (integers) or ratios in (0.0, 1.0] of the \
                   current workspace's geometry.",
            handler: move_pointer_relative,
        },
        CommandSpec {
            name: "MouseMove",
            params: &[],
            help: "Initiates a drag that moves the window under the pointer. Only \
                   works when bound to a mouse button.",
            handler: mouse_only,
        },
        CommandSpec {
            name: "MouseResize",
            params: &[DIRECTION],
            help: "Initiates a drag that resizes the window under the pointer. Only \
                   works when bound to a mouse button.\n\n\
                   Direction is one of Infer, Top, Bottom, Left, Right, TopLeft, \
                   TopRight, BottomLeft or BottomRight.",
            handler: mouse_only,
        },
    ]
}

fn move_pointer<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let (x, y) = (inv.int(0)?, inv.int(1)?);
    let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) else {
        return Err(CommandError::Aborted(format!(
            "{}: {}, {} is off any screen",
            inv.name(),
            x,
            y
        )));
    };
    session
        .wm
        .warp_pointer(x, y)
        .map_err(|e| collaborator(inv, e))?;
    Ok(Value::Nil)
}

fn move_pointer_relative<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let geom = session
        .wm
        .current_workspace()
        .map_err(|e| collaborator(inv, e))?
        .geom;
    let (x, y) = (inv.arg(0)?, inv.arg(1)?);
    let Some((dx, dy)) = parse_pair(&geom, x, y) else {
        return Err(CommandError::Aborted(format!(
            "{}: values must be pixels or ratios in (0.0, 1.0], got {} and {}",
            inv.name(),
            x,
            y
        )));
    };
    session
        .wm
        .warp_pointer(geom.x + dx, geom.y + dy)
        .map_err(|e| collaborator(inv, e))?;
    Ok(Value::Nil)
}

fn mouse_only<W: WindowManager>(_: &mut Session<W>, inv: &Invocation) -> Outcome {
    warn!("{} can only be bound to a mouse button", inv.name());
    Ok(Value::Nil)
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;

    #[test]
    fn absolute_pointer() {
        let mut f = Fixture::new();
        f.run("MovePointer 30 40").unwrap();
        assert_eq!(f.wm().pointer(), (30, 40));
    }

    #[test]
    fn absolute_pointer_rejects_ratios() {
        let mut f = Fixture::new();
        assert!(f.run("MovePointer 0.5 40").is_err());
        assert_eq!(f.wm().pointer(), (0, 0));
    }

    #[test]
    fn relative_pointer_uses_workspace_geometry() {
        let mut f = Fixture::new();
        f.run("MovePointerRelative 0.5 0.5").unwrap();
        assert_eq!(f.wm().pointer(), (960, 540));
    }

    #[test]
    fn relative_pointer_aborts_on_bad_axis() {
        let mut f = Fixture::new();
        assert!(matches!(
            f.run("MovePointerRelative 10 1.01"),
            Err(CommandError::Aborted(_))
        ));
        assert_eq!(f.wm().pointer(), (0, 0));
    }

    #[test]
    fn mouse_commands_do_nothing() {
        let mut f = Fixture::new();
        assert_eq!(f.run("MouseMove").unwrap(), Value::Nil);
        assert_eq!(f.run("MouseResize Infer").unwrap(), Value::Nil);
        assert_eq!(f.wm().pointer(), (0, 0));
    }
}
