use crate::command::Value;
use crate::registry::{CommandSpec, Invocation, Outcome};
use crate::session::Session;
use crate::traits::WindowManager;
use log::info;

pub(super) fn specs<W: WindowManager>() -> Vec<CommandSpec<W>> {
    vec![
        CommandSpec {
            name: "Restart",
            params: &[],
            help: "Stops the event loop and restarts the process with the same \
                   arguments.",
            handler: restart,
        },
        CommandSpec {
            name: "Quit",
            params: &[],
            help: "Stops the event loop and exits.",
            handler: quit,
        },
    ]
}

fn restart<W: WindowManager>(session: &mut Session<W>, _: &Invocation) -> Outcome {
    info!("restart requested");
    session.request_restart();
    Ok(Value::Nil)
}

fn quit<W: WindowManager>(session: &mut Session<W>, _: &Invocation) -> Outcome {
    info!("quit requested");
    session.request_quit();
    Ok(Value::Nil)
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use crate::session::LoopSignal;

    #[test]
    fn signals() {
        let mut f = Fixture::new();
        f.run("Restart").unwrap();
        assert_eq!(f.session.signal(), LoopSignal::RestartRequested);
        f.run("Quit").unwrap();
        assert_eq!(f.session.signal(), LoopSignal::QuitRequested);
    }

    #[test]
    fn takes_no_arguments() {
        let mut f = Fixture::new();
        assert!(f.run("Quit now").is_err());
        assert_eq!(f.session.signal(), LoopSignal::Continue);
    }
}
