pub mod command;
pub mod output;

pub use command::{CommandExecutor, CommandTimedOut, RealCommandExecutor};
pub use output::{Output, TerminalOutput};

#[cfg(test)]
pub use command::{MockCommandExecutor, MockCommandResult};
#[cfg(test)]
pub use output::MockOutput;
