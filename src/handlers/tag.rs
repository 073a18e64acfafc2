//! Named string tags stored as window properties.
//!
//! A tag `foo` on window `w` is the property `_WMBRIDGE_TAG_foo` on `w`.
//! The integer `0` addresses the root window, which makes it a convenient
//! place for global key/value pairs.

use super::{collaborator, ENTITY, STRING};
use crate::command::{CommandError, Value};
use crate::registry::{CommandSpec, Invocation, Outcome, ParamSpec};
use crate::resolve::resolve_tag_target;
use crate::session::Session;
use crate::traits::{WindowId, WindowManager};
use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

const TAG_PATTERN: &str = "^[-a-zA-Z0-9_]+$";
const PROPERTY_PREFIX: &str = "_WMBRIDGE_TAG_";

const TARGET: ParamSpec = ParamSpec::new("Client", ENTITY);
const NAME: ParamSpec = ParamSpec::new("Name", STRING);
const VALUE: ParamSpec = ParamSpec::new("Value", STRING);

fn tag_regex() -> Option<&'static Regex> {
    static TAG_RE: OnceLock<Option<Regex>> = OnceLock::new();
    TAG_RE
        .get_or_init(|| match Regex::new(TAG_PATTERN) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("tag pattern failed to compile: {}", e);
                None
            }
        })
        .as_ref()
}

/// Whether `name` is usable as a tag name.
pub fn valid_tag_name(name: &str) -> bool {
    tag_regex().is_some_and(|re| re.is_match(name))
}

/// The property key that stores tag `name`.
pub fn tag_property(name: &str) -> String {
    format!("{}{}", PROPERTY_PREFIX, name)
}

pub(super) fn specs<W: WindowManager>() -> Vec<CommandSpec<W>> {
    vec![
        CommandSpec {
            name: "TagGet",
            params: &[TARGET, NAME],
            help: "Retrieves the tag with name Name for the window specified by Client. \
                   Returns an empty string if the tag or the window does not exist.\n\n\
                   Client may be the window id or a substring that matches a window name. \
                   The id 0 refers to the root window.\n\n\
                   Tag names may only contain letters, numbers, dashes and underscores.",
            handler: tag_get,
        },
        CommandSpec {
            name: "TagSet",
            params: &[TARGET, NAME, VALUE],
            help: "Sets the tag Name to Value on the window specified by Client. Tags \
                   live as long as the window does.\n\n\
                   Client may be the window id or a substring that matches a window name. \
                   The id 0 refers to the root window.\n\n\
                   Tag names may only contain letters, numbers, dashes and underscores.",
            handler: tag_set,
        },
    ]
}

/// Check the tag name, then resolve the target window.
fn target<W: WindowManager>(
    session: &Session<W>,
    inv: &Invocation,
) -> Result<(Option<WindowId>, String), CommandError> {
    let name = inv.string(1)?;
    if !valid_tag_name(name) {
        return Err(CommandError::Validation(format!(
            "Tag names must match {}",
            TAG_PATTERN
        )));
    }
    let reference = inv.entity(0)?;
    let window = resolve_tag_target(&session.wm, &reference);
    if window.is_none() {
        debug!("{}: no window matches {}", inv.name(), reference);
    }
    Ok((window, tag_property(name)))
}

fn tag_get<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let (Some(window), key) = target(session, inv)? else {
        return Ok(Value::from(""));
    };
    match session.wm.get_property(window, &key) {
        Ok(value) => Ok(Value::Str(value.unwrap_or_default())),
        Err(e) => {
            warn!("could not read {} on {:#x}: {}", key, window, e);
            Ok(Value::from(""))
        }
    }
}

fn tag_set<W: WindowManager>(session: &mut Session<W>, inv: &Invocation) -> Outcome {
    let (Some(window), key) = target(session, inv)? else {
        return Ok(Value::Nil);
    };
    let value = inv.string(2)?;
    session
        .wm
        .set_property(window, &key, value)
        .map_err(|e| collaborator(inv, e))?;
    Ok(Value::Nil)
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;

    #[test]
    fn tag_names() {
        assert!(valid_tag_name("my-tag_1"));
        assert!(valid_tag_name("X"));
        assert!(!valid_tag_name("my tag"));
        assert!(!valid_tag_name(""));
        assert!(!valid_tag_name("ünïcode"));
        assert!(!valid_tag_name("a\nb"));
    }

    #[test]
    fn property_key() {
        assert_eq!(tag_property("role"), "_WMBRIDGE_TAG_role");
    }

    #[test]
    fn set_then_get() {
        let mut f = Fixture::new();
        f.run(r#"TagSet editor my-tag_1 "hello world""#).unwrap();
        assert_eq!(
            f.run("TagGet editor my-tag_1").unwrap(),
            Value::from("hello world")
        );
        assert_eq!(f.run("TagGet term-1 my-tag_1").unwrap(), Value::from(""));
    }

    #[test]
    fn invalid_name_is_rejected_without_writing() {
        let mut f = Fixture::new();
        let err = f.run(r#"TagSet 0 "my tag" v"#).unwrap_err();
        assert!(matches!(err, CommandError::Validation(_)));
        assert!(err.to_string().contains(TAG_PATTERN));
        let root = f.wm().root();
        assert_eq!(
            f.wm().get_property(root, &tag_property("my tag")).unwrap(),
            None
        );

        let err = f.run(r#"TagGet 0 "my tag""#).unwrap_err();
        assert!(matches!(err, CommandError::Validation(_)));
    }

    #[test]
    fn invalid_name_is_checked_before_resolution() {
        let mut f = Fixture::new();
        let err = f.run(r#"TagGet "no such window" "bad name""#).unwrap_err();
        assert!(matches!(err, CommandError::Validation(_)));
    }

    #[test]
    fn zero_targets_root() {
        let mut f = Fixture::new();
        f.session.wm.add_client_with_id(0, "zero", 0);
        f.run("TagSet 0 layout tall").unwrap();
        let root = f.wm().root();
        assert_eq!(
            f.wm().get_property(root, "_WMBRIDGE_TAG_layout").unwrap(),
            Some("tall".into())
        );
        assert_eq!(f.wm().get_property(0, "_WMBRIDGE_TAG_layout").unwrap(), None);
        assert_eq!(f.run("TagGet 0 layout").unwrap(), Value::from("tall"));
    }

    #[test]
    fn missing_target() {
        let mut f = Fixture::new();
        assert_eq!(f.run("TagSet nope k v").unwrap(), Value::Nil);
        assert_eq!(f.run("TagGet nope k").unwrap(), Value::from(""));
    }

    #[test]
    fn tags_die_with_their_window() {
        let mut f = Fixture::new();
        let id = f.ids[0];
        f.run(&format!("TagSet {} k v", id)).unwrap();
        f.run(&format!("Close {}", id)).unwrap();
        assert_eq!(f.run(&format!("TagGet {} k", id)).unwrap(), Value::from(""));
    }
}
