//! Commands and values used throughout wmbridge.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] is a named request with positional [`Value`] arguments,
//! [`ValueKind`] names the runtime type of a value, and [`CommandError`] /
//! [`MalformedCommand`] describe everything that can go wrong between
//! receiving a request and returning its result.
//!
//! Commands arrive in one of two wire forms:
//!
//! ```text
//! Move "term" 0.5 0.25
//! {"name":"Move","args":["term",0.5,0.25]}
//! ```

use crate::bridge::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Runtime type of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Int,
    Float,
    Str,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Nil => write!(f, "nil"),
            ValueKind::Int => write!(f, "int"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Str => write!(f, "string"),
        }
    }
}

/// Render a set of accepted kinds as `"int or string"`.
pub fn describe_kinds(kinds: &[ValueKind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// A command argument or return value.
///
/// Serialized untagged, so the JSON form is the bare value (`null`, `5`,
/// `0.5`, `"term"`).  Integers are tried before floats, which keeps `5` an
/// [`Int`](Value::Int) and `0.5` a [`Float`](Value::Float).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Nil,
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// A named request with positional arguments.
///
/// A command is only a request: whether the name exists and whether the
/// arguments have acceptable kinds is decided by the
/// [`Registry`](crate::registry::Registry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Command {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Parse a request line in either wire form.
    ///
    /// Lines starting with `{` are JSON; everything else uses the text
    /// syntax of [`FromStr`].
    pub fn parse_line(line: &str) -> Result<Self, MalformedCommand> {
        let line = line.trim();
        if line.starts_with('{') {
            serde_json::from_str(line).map_err(|e| MalformedCommand::Syntax(e.to_string()))
        } else {
            line.parse()
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Decimal, or hexadecimal with a `0x` prefix as window ids are usually
/// printed.
fn parse_int(s: &str) -> Option<i64> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    else {
        return s.parse().ok();
    };
    if !hex.starts_with(|c: char| c.is_ascii_hexdigit()) {
        return None;
    }
    let n = i64::from_str_radix(hex, 16).ok()?;
    Some(if negative { -n } else { n })
}

enum Token {
    Bare(String),
    Quoted(String),
}

impl Token {
    fn into_value(self) -> Value {
        match self {
            Token::Quoted(s) => Value::Str(s),
            Token::Bare(s) => {
                if let Some(n) = parse_int(&s) {
                    return Value::Int(n);
                }
                // Keep words like "inf" or "NaN" as strings.
                let numeric = s
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
                match s.parse::<f64>() {
                    Ok(x) if numeric => Value::Float(x),
                    _ => Value::Str(s),
                }
            }
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, MalformedCommand> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some(other) => text.push(other),
                        None => break,
                    },
                    other => text.push(other),
                }
            }
            if !closed {
                return Err(MalformedCommand::Syntax(format!(
                    "unterminated string in {:?}",
                    input
                )));
            }
            tokens.push(Token::Quoted(text));
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token::Bare(word));
        }
    }

    Ok(tokens)
}

/// Text syntax: `Name arg1 arg2 ...`.
///
/// Arguments are double-quoted strings (with `\"`, `\\`, `\n` and `\t`
/// escapes), integers, floats, or bare words, which become strings.
impl FromStr for Command {
    type Err = MalformedCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = tokenize(s)?.into_iter();
        let name = match tokens.next() {
            Some(Token::Bare(name)) => name,
            Some(Token::Quoted(_)) => {
                return Err(MalformedCommand::Syntax(
                    "command name must not be quoted".into(),
                ))
            }
            None => return Err(MalformedCommand::Syntax("empty command".into())),
        };
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(MalformedCommand::Syntax(format!(
                "invalid command name: {:?}",
                name
            )));
        }
        Ok(Command {
            name,
            args: tokens.map(Token::into_value).collect(),
        })
    }
}

/// A request that was rejected before its handler ran.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedCommand {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{command}: expected {expected} argument(s), got {got}")]
    Arity {
        command: String,
        expected: usize,
        got: usize,
    },
    #[error(
        "{command}: parameter {position} ({param}) expects {}, got {got}",
        describe_kinds(.expected)
    )]
    Type {
        command: String,
        position: usize,
        param: &'static str,
        expected: &'static [ValueKind],
        got: ValueKind,
    },
    #[error("{command}: argument {position} does not have the expected shape")]
    Argument { command: String, position: usize },
    #[error("cannot parse command: {0}")]
    Syntax(String),
}

/// Every way a dispatched command can fail.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Rejected before execution.
    #[error("malformed command: {0}")]
    Malformed(#[from] MalformedCommand),
    /// A domain constraint on an argument does not hold.
    #[error("{0}")]
    Validation(String),
    /// The handler declined to act; no state was changed.
    #[error("aborted: {0}")]
    Aborted(String),
    /// The window manager failed to carry out a request.
    #[error("window manager error: {0}")]
    Collaborator(String),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl CommandError {
    /// Soft failures are only reported to verbose callers; quiet callers
    /// see a no-op.
    pub fn is_soft(&self) -> bool {
        matches!(self, CommandError::Aborted(_) | CommandError::Collaborator(_))
    }
}
