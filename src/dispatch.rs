//! Validation, execution and error policy for incoming commands.
//!
//! A [`Dispatcher`] is the caller-side entry point: it checks a [`Command`]
//! against the [`Registry`], sends the matching handler across the bridge and
//! waits for its outcome.  Dispatchers are cheap to clone and may be used
//! from any number of threads at once.
//!
//! # Verbosity
//!
//! A quiet dispatch treats soft failures ([`CommandError::is_soft`]) as
//! silent no-ops and returns `Nil`.  A verbose dispatch hands them back to
//! the caller.  Malformed commands and validation errors are returned either
//! way.

use crate::bridge::BridgeHandle;
use crate::command::{Command, Value};
use crate::config::BridgeConfig;
use crate::registry::{Invocation, Outcome, Registry};
use crate::session::Session;
use crate::traits::WindowManager;
use log::{debug, info, warn};
use std::sync::Arc;

/// Shared handle for running commands on the event loop.
pub struct Dispatcher<W: WindowManager> {
    registry: Arc<Registry<W>>,
    bridge: BridgeHandle<Session<W>, Outcome>,
    verbose: bool,
}

impl<W: WindowManager> Clone for Dispatcher<W> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            bridge: self.bridge.clone(),
            verbose: self.verbose,
        }
    }
}

impl<W: WindowManager + 'static> Dispatcher<W> {
    pub fn new(
        registry: Registry<W>,
        bridge: BridgeHandle<Session<W>, Outcome>,
        config: &BridgeConfig,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            bridge,
            verbose: config.verbose,
        }
    }

    pub fn registry(&self) -> &Registry<W> {
        &self.registry
    }

    /// Help text for `name`, if it is a known command.
    pub fn help(&self, name: &str) -> Option<&'static str> {
        self.registry.get(name).map(|spec| spec.help)
    }

    /// Run `cmd` with the configured verbosity.
    pub fn dispatch(&self, cmd: &Command) -> Outcome {
        self.dispatch_with(cmd, self.verbose)
    }

    /// Run `cmd` verbosely regardless of configuration.
    pub fn dispatch_verbose(&self, cmd: &Command) -> Outcome {
        self.dispatch_with(cmd, true)
    }

    fn dispatch_with(&self, cmd: &Command, verbose: bool) -> Outcome {
        let spec = match self.registry.validate(cmd) {
            Ok(spec) => spec,
            Err(e) => {
                if verbose {
                    warn!("rejected {}: {}", cmd, e);
                } else {
                    debug!("rejected {}: {}", cmd, e);
                }
                return Err(e.into());
            }
        };

        if verbose {
            info!("running {}", cmd);
        } else {
            debug!("running {}", cmd);
        }

        let handler = spec.handler;
        let inv = Invocation::new(spec.name, cmd.args.clone());
        let outcome = self.bridge.run_sync(move |session| handler(session, &inv))?;

        match outcome {
            Err(e) if e.is_soft() && !verbose => {
                debug!("{} had no effect: {}", spec.name, e);
                Ok(Value::Nil)
            }
            Err(e) => {
                if verbose {
                    warn!("{} failed: {}", spec.name, e);
                }
                Err(e)
            }
            ok => ok,
        }
    }
}
