//! Scripted command runner (testing only)
//!
//! `ScriptedRunner` answers commands from a list of rules instead of
//! spawning processes, and records every command it completed.

use std::io;
use std::sync::Mutex;
use std::time::Duration;

use super::{CommandOutput, CommandRunner, CommandSpec};

type Matcher = Box<dyn Fn(&CommandSpec) -> bool + Send + Sync>;

struct Rule {
    matcher: Matcher,
    response: Response,
    delay: Option<Duration>,
}

#[derive(Clone)]
enum Response {
    Output(CommandOutput),
    SpawnError(io::ErrorKind),
}

/// Fake [`CommandRunner`] driven by substring rules.
///
/// Rules are tried in the order they were added; the first whose matcher
/// accepts the command decides the response. Unmatched commands succeed
/// with empty output. A command is recorded only once it has finished,
/// so [`ScriptedRunner::calls`] lists completed invocations.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl std::fmt::Debug for ScriptedRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedRunner")
            .field("rules", &self.rules.len())
            .field("calls", &self.calls())
            .finish()
    }
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `output` to commands whose display form contains `needle`.
    pub fn on(self, needle: &str, output: CommandOutput) -> Self {
        let needle = needle.to_string();
        self.on_match(move |cmd| cmd.to_string().contains(&needle), output)
    }

    /// Respond with `output` to commands accepted by `matcher`.
    pub fn on_match(
        mut self,
        matcher: impl Fn(&CommandSpec) -> bool + Send + Sync + 'static,
        output: CommandOutput,
    ) -> Self {
        self.rules.push(Rule {
            matcher: Box::new(matcher),
            response: Response::Output(output),
            delay: None,
        });
        self
    }

    /// Like [`ScriptedRunner::on`], but the command takes `delay` to finish.
    pub fn on_slow(mut self, needle: &str, output: CommandOutput, delay: Duration) -> Self {
        let needle = needle.to_string();
        self.rules.push(Rule {
            matcher: Box::new(move |cmd| cmd.to_string().contains(&needle)),
            response: Response::Output(output),
            delay: Some(delay),
        });
        self
    }

    /// Fail to spawn commands containing `needle` (e.g. a missing binary).
    pub fn spawn_error(mut self, needle: &str, kind: io::ErrorKind) -> Self {
        let needle = needle.to_string();
        self.rules.push(Rule {
            matcher: Box::new(move |cmd| cmd.to_string().contains(&needle)),
            response: Response::SpawnError(kind),
            delay: None,
        });
        self
    }

    /// Completed commands, in completion order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Display forms of completed commands.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }

    /// Number of completed commands whose display form contains `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.command_lines()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        let rule = self.rules.iter().find(|rule| (rule.matcher)(command));
        let (response, delay) = match rule {
            Some(rule) => (rule.response.clone(), rule.delay),
            None => (Response::Output(CommandOutput::success()), None),
        };

        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        self.calls.lock().unwrap().push(command.clone());

        match response {
            Response::Output(output) => Ok(output),
            Response::SpawnError(kind) => Err(io::Error::new(kind, "scripted spawn failure")),
        }
    }
}
