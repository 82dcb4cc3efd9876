use std::io::{IsTerminal, stderr, stdout};

/// Terminal-detection seam so runs under test can force non-interactive
/// behaviour.
pub trait TerminalClient {
    /// Returns whether stdout is attached to a terminal.
    fn stdout_is_terminal(&self) -> bool;

    /// Returns whether stderr is attached to a terminal.
    fn stderr_is_terminal(&self) -> bool;
}

/// Terminal detection backed by the real process streams.
#[derive(Debug, Default)]
pub struct SystemTerminalClient;

impl TerminalClient for SystemTerminalClient {
    fn stdout_is_terminal(&self) -> bool {
        stdout().is_terminal()
    }

    fn stderr_is_terminal(&self) -> bool {
        stderr().is_terminal()
    }
}
