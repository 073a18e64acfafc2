//! Entry point for the **wmbridge** daemon.
//!
//! Runs the event loop on the main thread and the socket listener on a
//! background thread.  Also doubles as a client:
//!
//! ```text
//! wmbridge                      # run the daemon
//! wmbridge --send 'Focus term'  # send one command, print the reply
//! wmbridge --list-commands      # print the command catalog
//! ```

use log::{error, info};
use std::os::unix::process::CommandExt;
use std::time::Duration;
use wmbridge::bridge;
use wmbridge::config::Config;
use wmbridge::dispatch::Dispatcher;
use wmbridge::handlers;
use wmbridge::headless::HeadlessWm;
use wmbridge::ipc::listener::{self, Reply, UnixSocketListener};
use wmbridge::session::{LoopSignal, Session};
use wmbridge::traits::{CommandSource, WindowManager};

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/wmbridge.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/wmbridge`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("wmbridge")
}

/// Try to load the config from `$XDG_CONFIG_HOME/wmbridge/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let config = load_config();
    let socket_path = config
        .socket_path
        .clone()
        .unwrap_or_else(default_socket_path);

    match args.get(1).map(String::as_str) {
        Some("--list-commands") => list_commands(),
        Some("--send") => {
            let line = args[2..].join(" ");
            send(&socket_path, &line);
        }
        _ => run_daemon(config, socket_path),
    }
}

fn list_commands() {
    let registry = match handlers::catalog::<HeadlessWm>() {
        Ok(r) => r,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    for spec in registry.catalog() {
        println!("{}", spec.usage());
        for line in spec.help.lines() {
            println!("    {}", line);
        }
        println!();
    }
}

fn send(socket_path: &str, line: &str) {
    match listener::send(socket_path, line) {
        Ok(Reply::Ok(value)) => println!("{}", value),
        Ok(Reply::Error(msg)) => {
            eprintln!("{}", msg);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("cannot reach {}: {}", socket_path, e);
            std::process::exit(2);
        }
    }
}

/// Normal daemon mode.
fn run_daemon(config: Config, socket_path: String) {
    let wm = HeadlessWm::from_config(&config.headless);
    match wm.workspaces() {
        Ok(ws) => info!("managing {} workspace(s)", ws.len()),
        Err(e) => {
            error!("failed to query workspaces: {}", e);
            std::process::exit(1);
        }
    }

    let registry = match handlers::catalog() {
        Ok(r) => r,
        Err(e) => {
            error!("failed to build command catalog: {}", e);
            std::process::exit(1);
        }
    };
    info!("{} commands registered", registry.len());

    let (handle, executor) = bridge::channel();
    let dispatcher = Dispatcher::new(registry, handle, &config.bridge);
    spawn_command_sources(dispatcher, &socket_path);

    info!("wmbridge running");
    let mut session = Session::new(wm);
    let signal = session.run(&executor, Duration::from_millis(config.bridge.tick_ms));
    let _ = std::fs::remove_file(&socket_path);

    if signal == LoopSignal::RestartRequested {
        restart();
    }
    info!("exiting");
}

/// Replace the current process with a fresh copy of itself.
fn restart() {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            error!("cannot locate own executable: {}", e);
            std::process::exit(1);
        }
    };
    info!("restarting {}", exe.display());
    let err = std::process::Command::new(&exe)
        .args(std::env::args().skip(1))
        .exec();
    error!("restart failed: {}", err);
    std::process::exit(1);
}

//  Helpers

fn spawn_command_sources<W: WindowManager + 'static>(dispatcher: Dispatcher<W>, path: &str) {
    let path = path.to_string();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(dispatcher) {
            error!("socket listener error: {}", e);
        }
    });
}
