//! Unix-socket [`CommandSource`] implementation.
//!
//! Binds a Unix stream socket and serves every connection on its own thread.
//! Each line received is parsed as a [`Command`], dispatched verbosely, and
//! answered with exactly one line of JSON.
//!
//! # Wire format
//!
//! Requests are either the text form or a JSON object:
//!
//! ```text
//! Move "term" 0.5 0.5
//! {"name":"TagSet","args":[0,"layout","tall"]}
//! ```
//!
//! Replies carry the command's value or a message:
//!
//! ```json
//! {"ok":null}
//! {"ok":"tall"}
//! {"error":"Tag names must match ^[-a-zA-Z0-9_]+$"}
//! ```

use crate::command::{Command, CommandError, Value};
use crate::dispatch::Dispatcher;
use crate::traits::{CommandSource, WindowManager};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::thread;

/// One reply line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reply {
    Ok(Value),
    Error(String),
}

impl From<Result<Value, CommandError>> for Reply {
    fn from(outcome: Result<Value, CommandError>) -> Self {
        match outcome {
            Ok(value) => Reply::Ok(value),
            Err(e) => Reply::Error(e.to_string()),
        }
    }
}

/// A [`CommandSource`] that listens on a Unix stream socket.
///
/// Each accepted connection can send multiple newline-delimited commands
/// and receives one reply line per command.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UnixSocketListener {
    /// Create a new listener bound to `path`.
    ///
    /// The socket file is created when [`run`](CommandSource::run) is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** indefinitely.  Run it on a dedicated thread.
    fn run<W: WindowManager + 'static>(
        &mut self,
        dispatcher: Dispatcher<W>,
    ) -> Result<(), Self::Error> {
        // Remove stale socket if present.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let dispatcher = dispatcher.clone();
                    thread::spawn(move || {
                        debug!("client connected");
                        if let Err(e) = serve(stream, &dispatcher) {
                            error!("connection error: {}", e);
                        }
                        debug!("client disconnected");
                    });
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
        Ok(())
    }
}

/// Answer every line on `stream` until the peer closes it.
fn serve<W: WindowManager + 'static>(
    stream: UnixStream,
    dispatcher: &Dispatcher<W>,
) -> Result<(), UnixSocketError> {
    let mut writer = stream.try_clone()?;
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let text = line?;
        if text.trim().is_empty() {
            continue;
        }
        let reply: Reply = match Command::parse_line(&text) {
            Ok(cmd) => {
                debug!("received {}", cmd);
                dispatcher.dispatch_verbose(&cmd).into()
            }
            Err(e) => {
                error!("bad command: {}: {}", text, e);
                Reply::Error(e.to_string())
            }
        };
        serde_json::to_writer(&mut writer, &reply)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    Ok(())
}

/// Send one command to the socket at `path` and wait for its reply.
pub fn send(path: impl AsRef<Path>, line: &str) -> Result<Reply, UnixSocketError> {
    let mut stream = UnixStream::connect(path)?;
    writeln!(stream, "{}", line)?;
    stream.shutdown(std::net::Shutdown::Write)?;
    let mut reply = String::new();
    BufReader::new(stream).read_line(&mut reply)?;
    Ok(serde_json::from_str(&reply)?)
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge;
    use crate::config::BridgeConfig;
    use crate::handlers;
    use crate::headless::HeadlessWm;
    use crate::session::Session;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Monotonic counter to generate unique socket paths per test.
    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    /// Helper: create a unique temporary socket path for each test.
    fn tmp_socket_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir();
        dir.join(format!(
            "wmbridge-test-{}-{}.sock",
            std::process::id(),
            id
        ))
    }

    /// Helper: start an event loop and a listener on `path`.
    fn start(path: &Path) {
        let (handle, executor) = bridge::channel();
        std::thread::spawn(move || {
            let mut wm = HeadlessWm::default();
            wm.add_client("term-1", 0);
            wm.add_client("editor", 1);
            Session::new(wm).run(&executor, Duration::from_millis(5));
        });

        let dispatcher = Dispatcher::new(
            handlers::catalog::<HeadlessWm>().unwrap(),
            handle,
            &BridgeConfig::default(),
        );
        let path = path.to_path_buf();
        std::thread::spawn(move || {
            let mut listener = UnixSocketListener::new(&path);
            let _ = listener.run(dispatcher);
        });

        // Give the listener a moment to bind.
        std::thread::sleep(Duration::from_millis(150));
    }

    #[test]
    fn round_trip_commands_over_socket() {
        let path = tmp_socket_path();
        start(&path);

        let mut stream = UnixStream::connect(&path).expect("connect");
        writeln!(stream, r#"Move "term" 0.5 0.5"#).unwrap();
        writeln!(stream, r#"{{"name":"GetClientX","args":["term"]}}"#).unwrap();
        writeln!(stream, "TagSet 0 layout tall").unwrap();
        writeln!(stream, "TagGet 0 layout").unwrap();
        stream.shutdown(std::net::Shutdown::Write).unwrap();

        let replies: Vec<Reply> = BufReader::new(stream)
            .lines()
            .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
            .collect();
        assert_eq!(
            replies,
            vec![
                Reply::Ok(Value::Nil),
                Reply::Ok(Value::Int(960)),
                Reply::Ok(Value::Nil),
                Reply::Ok(Value::from("tall")),
            ]
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_input_gets_an_error_reply() {
        let path = tmp_socket_path();
        start(&path);

        let mut stream = UnixStream::connect(&path).expect("connect");
        writeln!(stream, "{{not json").unwrap();
        writeln!(stream, "Explode 1").unwrap();
        writeln!(stream, "Close 1.5").unwrap();
        writeln!(stream).unwrap();
        writeln!(stream, "GetWorkspace").unwrap();
        stream.shutdown(std::net::Shutdown::Write).unwrap();

        let replies: Vec<Reply> = BufReader::new(stream)
            .lines()
            .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
            .collect();
        // The blank line gets no reply.
        assert_eq!(replies.len(), 4);
        assert!(matches!(replies[0], Reply::Error(_)));
        assert!(matches!(&replies[1], Reply::Error(m) if m.contains("Explode")));
        assert!(matches!(&replies[2], Reply::Error(m) if m.contains("int or string")));
        assert_eq!(replies[3], Reply::Ok(Value::from("1")));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn stale_socket_file_is_replaced() {
        let path = tmp_socket_path();
        std::fs::write(&path, b"left over").unwrap();
        start(&path);

        assert_eq!(send(&path, "GetWorkspace").unwrap(), Reply::Ok(Value::from("1")));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn socket_callers_see_soft_failures() {
        let path = tmp_socket_path();
        start(&path);

        let reply = send(&path, "Move term 0.5 2.0").unwrap();
        assert!(matches!(reply, Reply::Error(_)));
        assert_eq!(send(&path, "GetClientX term").unwrap(), Reply::Ok(Value::Int(0)));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn connections_are_served_concurrently() {
        let path = tmp_socket_path();
        start(&path);

        // An idle connection must not block others.
        let idle = UnixStream::connect(&path).expect("connect");
        assert_eq!(
            send(&path, "GetClientName editor").unwrap(),
            Reply::Ok(Value::from("editor"))
        );
        drop(idle);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn reply_wire_format() {
        assert_eq!(
            serde_json::to_string(&Reply::Ok(Value::Nil)).unwrap(),
            r#"{"ok":null}"#
        );
        assert_eq!(
            serde_json::to_string(&Reply::Error("boom".into())).unwrap(),
            r#"{"error":"boom"}"#
        );
    }
}
