//! The closed catalog of commands.
//!
//! A [`Registry`] maps command names to [`CommandSpec`]s.  Each spec lists
//! its parameters with the value kinds they accept and points at the
//! handler that carries the command out.  [`Registry::validate`] checks a
//! [`Command`] against its spec; a command that fails validation never
//! reaches its handler.

use crate::command::{Command, CommandError, MalformedCommand, Value, ValueKind};
use crate::geometry::GeometryValue;
use crate::resolve::EntityRef;
use crate::session::Session;
use crate::traits::WindowManager;
use std::collections::BTreeMap;

/// What a handler produces.
pub type Outcome = Result<Value, CommandError>;

/// A command implementation.  Runs on the thread that owns the session.
pub type Handler<W> = fn(&mut Session<W>, &Invocation) -> Outcome;

/// One positional parameter of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub accepts: &'static [ValueKind],
}

impl ParamSpec {
    pub const fn new(name: &'static str, accepts: &'static [ValueKind]) -> Self {
        Self { name, accepts }
    }
}

/// A registered command.
pub struct CommandSpec<W: WindowManager> {
    pub name: &'static str,
    pub params: &'static [ParamSpec],
    pub help: &'static str,
    pub handler: Handler<W>,
}

impl<W: WindowManager> CommandSpec<W> {
    /// `Move Client:int|string X:int|float Y:int|float`
    pub fn usage(&self) -> String {
        let mut usage = self.name.to_string();
        for p in self.params {
            let kinds: Vec<String> = p.accepts.iter().map(ToString::to_string).collect();
            usage.push_str(&format!(" {}:{}", p.name, kinds.join("|")));
        }
        usage
    }
}

/// A validated command, as seen by its handler.
#[derive(Debug, Clone)]
pub struct Invocation {
    name: &'static str,
    args: Vec<Value>,
}

impl Invocation {
    pub fn new(name: &'static str, args: Vec<Value>) -> Self {
        Self { name, args }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    fn shape_error(&self, position: usize) -> CommandError {
        MalformedCommand::Argument {
            command: self.name.to_string(),
            position: position + 1,
        }
        .into()
    }

    pub fn arg(&self, i: usize) -> Result<&Value, CommandError> {
        self.args.get(i).ok_or_else(|| self.shape_error(i))
    }

    pub fn entity(&self, i: usize) -> Result<EntityRef, CommandError> {
        EntityRef::from_value(self.arg(i)?).ok_or_else(|| self.shape_error(i))
    }

    pub fn geometry(&self, i: usize) -> Result<GeometryValue, CommandError> {
        GeometryValue::from_value(self.arg(i)?).ok_or_else(|| self.shape_error(i))
    }

    pub fn int(&self, i: usize) -> Result<i64, CommandError> {
        match self.arg(i)? {
            Value::Int(n) => Ok(*n),
            _ => Err(self.shape_error(i)),
        }
    }

    pub fn string(&self, i: usize) -> Result<&str, CommandError> {
        match self.arg(i)? {
            Value::Str(s) => Ok(s),
            _ => Err(self.shape_error(i)),
        }
    }
}

/// Errors building a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("command registered twice: {0}")]
    Duplicate(&'static str),
}

/// The closed set of commands a dispatcher will run.
pub struct Registry<W: WindowManager> {
    commands: BTreeMap<&'static str, CommandSpec<W>>,
}

impl<W: WindowManager> Default for Registry<W> {
    fn default() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }
}

impl<W: WindowManager> Registry<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command.  Names are unique.
    pub fn register(&mut self, spec: CommandSpec<W>) -> Result<(), RegistryError> {
        if self.commands.contains_key(spec.name) {
            return Err(RegistryError::Duplicate(spec.name));
        }
        self.commands.insert(spec.name, spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec<W>> {
        self.commands.get(name)
    }

    /// All commands, ordered by name.
    pub fn catalog(&self) -> impl Iterator<Item = &CommandSpec<W>> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Check name, arity and argument kinds.
    pub fn validate(&self, cmd: &Command) -> Result<&CommandSpec<W>, MalformedCommand> {
        let spec = self
            .get(&cmd.name)
            .ok_or_else(|| MalformedCommand::Unknown(cmd.name.clone()))?;

        if cmd.args.len() != spec.params.len() {
            return Err(MalformedCommand::Arity {
                command: cmd.name.clone(),
                expected: spec.params.len(),
                got: cmd.args.len(),
            });
        }

        for (i, (param, arg)) in spec.params.iter().zip(&cmd.args).enumerate() {
            if !param.accepts.contains(&arg.kind()) {
                return Err(MalformedCommand::Type {
                    command: cmd.name.clone(),
                    position: i + 1,
                    param: param.name,
                    expected: param.accepts,
                    got: arg.kind(),
                });
            }
        }

        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessWm;

    const ENTITY: &[ValueKind] = &[ValueKind::Int, ValueKind::Str];
    const CLIENT: ParamSpec = ParamSpec::new("Client", ENTITY);

    fn nil(_: &mut Session<HeadlessWm>, _: &Invocation) -> Outcome {
        Ok(Value::Nil)
    }

    fn registry() -> Registry<HeadlessWm> {
        let mut r = Registry::new();
        r.register(CommandSpec {
            name: "Close",
            params: &[CLIENT],
            help: "Close a client.",
            handler: nil,
        })
        .unwrap();
        r.register(CommandSpec {
            name: "Quit",
            params: &[],
            help: "Stop.",
            handler: nil,
        })
        .unwrap();
        r
    }

    #[test]
    fn accepts_each_declared_kind() {
        let r = registry();
        assert!(r.validate(&Command::new("Close", vec![Value::Int(3)])).is_ok());
        assert!(r.validate(&Command::new("Close", vec![Value::from("x")])).is_ok());
        assert!(r.validate(&Command::new("Quit", vec![])).is_ok());
    }

    #[test]
    fn unknown_command() {
        let err = registry()
            .validate(&Command::new("Explode", vec![]))
            .err()
            .unwrap();
        assert_eq!(err, MalformedCommand::Unknown("Explode".into()));
    }

    #[test]
    fn wrong_arity() {
        let err = registry()
            .validate(&Command::new("Close", vec![]))
            .err()
            .unwrap();
        assert_eq!(
            err,
            MalformedCommand::Arity {
                command: "Close".into(),
                expected: 1,
                got: 0
            }
        );
    }

    #[test]
    fn wrong_kind_names_accepted_kinds() {
        let err = registry()
            .validate(&Command::new("Close", vec![Value::Float(1.5)]))
            .err()
            .unwrap();
        match &err {
            MalformedCommand::Type {
                expected, got, position, ..
            } => {
                assert_eq!(*expected, ENTITY);
                assert_eq!(*got, ValueKind::Float);
                assert_eq!(*position, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("int or string"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut r = registry();
        let dup = CommandSpec {
            name: "Quit",
            params: &[],
            help: "",
            handler: nil,
        };
        assert!(matches!(r.register(dup), Err(RegistryError::Duplicate("Quit"))));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn catalog_is_sorted() {
        let names: Vec<&str> = registry().catalog().map(|s| s.name).collect();
        assert_eq!(names, vec!["Close", "Quit"]);
    }

    #[test]
    fn usage_lists_kinds() {
        let r = registry();
        assert_eq!(r.get("Close").unwrap().usage(), "Close Client:int|string");
    }

    #[test]
    fn invocation_accessors() {
        let args = vec![Value::Int(1), Value::from("a"), Value::Float(0.5)];
        let inv = Invocation::new("T", args);
        assert_eq!(inv.int(0).unwrap(), 1);
        assert_eq!(inv.string(1).unwrap(), "a");
        assert_eq!(inv.geometry(2).unwrap(), GeometryValue::Ratio(0.5));
        assert_eq!(inv.entity(1).unwrap(), EntityRef::Name("a".into()));
        assert!(matches!(
            inv.string(0),
            Err(CommandError::Malformed(MalformedCommand::Argument { position: 1, .. }))
        ));
        assert!(inv.arg(3).is_err());
    }
}
