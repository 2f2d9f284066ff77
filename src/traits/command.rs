use anyhow::Result;
use std::fmt;
use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Interval between polls of a child process running under a timeout
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Trait for executing system commands, allowing for mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments and return its captured output.
    ///
    /// When `timeout` is set the child is killed once it elapses and a
    /// [`CommandTimedOut`] error is returned.
    fn execute(&self, command: &str, args: &[&str], timeout: Option<Duration>) -> Result<Output>;
}

/// Error returned when a command was killed because its timeout elapsed
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTimedOut {
    pub command: String,
    pub timeout: Duration,
}

impl fmt::Display for CommandTimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' did not finish within {:.1}s",
            self.command,
            self.timeout.as_secs_f64()
        )
    }
}

impl std::error::Error for CommandTimedOut {}

/// Real command executor using std::process::Command
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    pub fn new() -> Self {
        Self
    }

    fn execute_bounded(&self, command: &str, args: &[&str], timeout: Duration) -> Result<Output> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain both pipes on their own threads so a chatty child cannot block on a full pipe
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }

            if started.elapsed() >= timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandTimedOut {
                    command: command.to_string(),
                    timeout,
                }
                .into());
            }

            thread::sleep(POLL_INTERVAL);
        };

        Ok(Output {
            status,
            stdout: join_reader(stdout_reader),
            stderr: join_reader(stderr_reader),
        })
    }
}

impl Default for RealCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, command: &str, args: &[&str], timeout: Option<Duration>) -> Result<Output> {
        match timeout {
            Some(timeout) => self.execute_bounded(command, args, timeout),
            None => {
                let output = Command::new(command)
                    .args(args)
                    .stdin(Stdio::null())
                    .output()?;

                Ok(output)
            }
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        buffer
    })
}

fn join_reader(reader: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// Mock command executor for testing
#[cfg(test)]
pub struct MockCommandExecutor {
    /// Pre-configured outputs for commands
    outputs: std::sync::Mutex<Vec<MockCommandResult>>,
    /// Every command line executed, in order
    calls: std::sync::Mutex<Vec<String>>,
}

/// A canned result, matched when `command` is a prefix of the executed command line
#[cfg(test)]
#[derive(Clone, Debug)]
pub struct MockCommandResult {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[cfg(test)]
impl MockCommandResult {
    pub fn success(command: impl Into<String>, stdout: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            exit_code: 254,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

#[cfg(test)]
impl MockCommandExecutor {
    pub fn new() -> Self {
        Self {
            outputs: std::sync::Mutex::new(Vec::new()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_outputs(outputs: Vec<MockCommandResult>) -> Self {
        Self {
            outputs: std::sync::Mutex::new(outputs),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn add_output(&self, output: MockCommandResult) {
        let mut outputs = self.outputs.lock().unwrap();
        outputs.push(output);
    }

    /// Command lines executed so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Default for MockCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, command: &str, args: &[&str], _timeout: Option<Duration>) -> Result<Output> {
        let line = std::iter::once(command)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(line.clone());

        let mut outputs = self.outputs.lock().unwrap();

        if let Some(result) = outputs.iter().position(|r| line.starts_with(&r.command)) {
            let mock_result = outputs.remove(result);
            return Ok(Output {
                status: create_exit_status(mock_result.exit_code),
                stdout: mock_result.stdout.into_bytes(),
                stderr: mock_result.stderr.into_bytes(),
            });
        }

        // Default: successful empty output
        Ok(Output {
            status: create_exit_status(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}

#[cfg(test)]
fn create_exit_status(code: i32) -> std::process::ExitStatus {
    // ExitStatus can't be constructed directly, build it from a raw wait status
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code as u32)
    }
}
