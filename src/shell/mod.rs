//! Host command execution.
//!
//! Runs one command string through the platform shell (`sh -c` on Unix,
//! `cmd.exe /C` on Windows) and turns the outcome into the text handed back
//! to the model. Commands inherit the environment and working directory of
//! the server process and run with its privileges. Nothing is filtered and
//! there is no timeout.
//!
//! # Examples
//!
//! ```no_run
//! use shellchat::shell::run_command;
//!
//! # async fn example() {
//! let text = run_command("ls /tmp").await;
//! println!("{text}");
//! # }
//! ```

use std::io;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// Text returned for a successful command that printed nothing.
pub const NO_OUTPUT_PLACEHOLDER: &str = "Command executed successfully (no output).";

/// Configuration for platform-specific shell execution.
///
/// # Examples
///
/// ```
/// use shellchat::shell::ShellConfig;
///
/// let config = ShellConfig::default();
/// # #[cfg(unix)]
/// assert_eq!(config.command, "sh");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ShellConfig {
    /// The shell executable (e.g., "sh" or "cmd.exe").
    pub command: String,
    /// Arguments to pass before the command string (e.g., ["-c"] or ["/C"]).
    pub args: Vec<String>,
}

#[cfg(unix)]
impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            command: "sh".to_string(),
            args: vec!["-c".to_string()],
        }
    }
}

#[cfg(windows)]
impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            command: "cmd.exe".to_string(),
            args: vec!["/C".to_string()],
        }
    }
}

impl ShellConfig {
    /// Runs `command` through this shell and captures its output.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the shell cannot be spawned or its output
    /// cannot be collected. A command that runs and fails is not an error;
    /// see [`ShellOutput::exit_code`].
    pub async fn execute(&self, command: &str) -> io::Result<ShellOutput> {
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(ShellOutput {
            exit_code: exit_code(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Runs `command` and returns the text summary. Never fails.
    pub async fn run(&self, command: &str) -> String {
        match self.execute(command).await {
            Ok(output) => output.summary(),
            Err(e) => format!("Error executing command: {e}"),
        }
    }
}

/// Numeric exit status. Signal deaths map to `-signal` on Unix.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}

/// Output from a shell command execution.
///
/// # Examples
///
/// ```
/// use shellchat::shell::ShellOutput;
///
/// let output = ShellOutput {
///     exit_code: 0,
///     stdout: "a.txt\nb.txt\n".to_string(),
///     stderr: String::new(),
/// };
/// assert_eq!(output.summary(), "a.txt\nb.txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    /// The exit code of the process.
    pub exit_code: i32,
    /// Standard output captured from the process.
    pub stdout: String,
    /// Standard error captured from the process.
    pub stderr: String,
}

impl ShellOutput {
    /// Returns `true` if the command exited with code 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Normalizes the output into the text sent back to the model.
    ///
    /// - success with output: trimmed stdout
    /// - success without output: [`NO_OUTPUT_PLACEHOLDER`]
    /// - failure: exit code, trimmed stdout and trimmed stderr on separate lines
    #[must_use]
    pub fn summary(&self) -> String {
        let stdout = self.stdout.trim();

        if !self.success() {
            return format!(
                "Command failed with return code {}.\nOutput: {}\nError: {}",
                self.exit_code,
                stdout,
                self.stderr.trim()
            );
        }

        if stdout.is_empty() {
            NO_OUTPUT_PLACEHOLDER.to_string()
        } else {
            stdout.to_string()
        }
    }
}

/// Runs a command with the platform's default shell and returns the summary.
pub async fn run_command(command: &str) -> String {
    ShellConfig::default().run(command).await
}
