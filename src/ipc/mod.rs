//! IPC listener that accepts commands over a Unix socket.
//!
//! External tools (scripts, key-bind helpers, etc.) can connect to the
//! socket, send newline-delimited commands, and read one JSON reply per
//! command.

pub mod listener;
