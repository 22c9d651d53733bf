//! Subprocess execution: git commands, hook commands, and cancellation.
//!
//! Every external command goes through this module:
//! - [`Cmd`] runs a program with captured output (used for all git calls)
//! - [`execute_streaming`] runs a shell command with output routed to stderr (hooks)
//!
//! Both honor the process-wide cancellation state set up by
//! [`install_signal_handlers`]. On SIGINT/SIGTERM the running child receives
//! the signal too, and the caller gets a [`WtError::Cancelled`](crate::git::WtError).
//!
//! Hooks run through the platform shell:
//! - Unix: `sh -c`
//! - Windows: Git Bash if available, PowerShell otherwise

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

use crate::git::{GitError, WtError};

/// How often a waiting parent checks for a pending signal.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Cached shell configuration for the current platform
static SHELL_CONFIG: OnceLock<ShellConfig> = OnceLock::new();

/// Shell configuration for hook execution
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub executable: PathBuf,
    /// Arguments before the command string (`-c` for sh)
    pub args: Vec<String>,
    pub is_posix: bool,
    /// Human-readable name for error messages
    pub name: String,
}

impl ShellConfig {
    pub fn get() -> &'static ShellConfig {
        SHELL_CONFIG.get_or_init(detect_shell)
    }

    /// Create a Command that hands `shell_command` to the shell as a single argument.
    pub fn command(&self, shell_command: &str) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.args);
        cmd.arg(shell_command);
        cmd
    }
}

fn detect_shell() -> ShellConfig {
    #[cfg(unix)]
    {
        ShellConfig {
            executable: PathBuf::from("sh"),
            args: vec!["-c".to_string()],
            is_posix: true,
            name: "sh".to_string(),
        }
    }

    #[cfg(windows)]
    {
        if let Some(bash) = find_git_bash() {
            return ShellConfig {
                executable: bash,
                args: vec!["-c".to_string()],
                is_posix: true,
                name: "Git Bash".to_string(),
            };
        }
        ShellConfig {
            executable: PathBuf::from("powershell.exe"),
            args: vec!["-NoProfile".to_string(), "-Command".to_string()],
            is_posix: false,
            name: "PowerShell".to_string(),
        }
    }
}

/// Locate bash.exe next to the `git.exe` on PATH.
///
/// `which bash` is avoided because it usually finds the WSL launcher first.
#[cfg(windows)]
fn find_git_bash() -> Option<PathBuf> {
    let git = which::which("git").ok()?;
    let install_dir = git.parent()?.parent()?;
    [
        install_dir.join("bin").join("bash.exe"),
        install_dir.join("usr").join("bin").join("bash.exe"),
    ]
    .into_iter()
    .find(|p| p.exists())
}

// ============================================================================
// Cancellation
// ============================================================================

/// First signal observed, or 0.
static RECEIVED_SIGNAL: AtomicI32 = AtomicI32::new(0);

#[cfg(unix)]
static SIGNALS: OnceLock<std::sync::Mutex<signal_hook::iterator::Signals>> = OnceLock::new();

/// Take over SIGINT/SIGTERM for the rest of the process.
///
/// After this, the signals no longer kill git-wt outright. They are recorded,
/// forwarded to whichever child is running, and surface as a cancellation
/// error at the next check.
pub fn install_signal_handlers() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use signal_hook::consts::{SIGINT, SIGTERM};
        let signals = signal_hook::iterator::Signals::new([SIGINT, SIGTERM])?;
        let _ = SIGNALS.set(std::sync::Mutex::new(signals));
    }
    Ok(())
}

/// The signal that cancelled this invocation, if any.
pub fn received_signal() -> Option<i32> {
    #[cfg(unix)]
    if let Some(signals) = SIGNALS.get()
        && let Ok(mut signals) = signals.lock()
    {
        for sig in signals.pending() {
            let _ = RECEIVED_SIGNAL.compare_exchange(0, sig, Ordering::SeqCst, Ordering::SeqCst);
        }
    }
    match RECEIVED_SIGNAL.load(Ordering::SeqCst) {
        0 => None,
        sig => Some(sig),
    }
}

/// Return a cancellation error if a signal has arrived.
///
/// Called between units of work (files in the copier, targets in delete).
pub fn check_cancelled() -> anyhow::Result<()> {
    match received_signal() {
        Some(signal) => Err(WtError::Cancelled { signal }.into()),
        None => Ok(()),
    }
}

/// Convert an `Interrupted` error from [`Cmd::run`] into the typed cancellation error.
pub fn cancellation_error(err: &std::io::Error) -> Option<anyhow::Error> {
    if err.kind() != ErrorKind::Interrupted {
        return None;
    }
    let signal = received_signal().unwrap_or(2);
    Some(WtError::Cancelled { signal }.into())
}

// ============================================================================
// Builder-style command execution
// ============================================================================

/// Builder for running a program with captured output.
///
/// ```ignore
/// let output = Cmd::new("git")
///     .args(["status", "--porcelain"])
///     .current_dir(&worktree)
///     .context("feature")
///     .run()?;
/// ```
///
/// Every run is logged at debug level as `$ program args [context]`, followed by
/// a `[wt-trace]` line with the duration.
pub struct Cmd {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    context: Option<String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            context: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Set the logging context (typically the worktree directory name).
    pub fn context(mut self, ctx: impl Into<String>) -> Self {
        self.context = Some(ctx.into());
        self
    }

    /// Run to completion and capture stdout/stderr.
    ///
    /// Returns an `Interrupted` error if a signal arrives while the child runs;
    /// the child's process group receives the signal before we reap it.
    pub fn run(self) -> std::io::Result<std::process::Output> {
        let cmd_str = if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        };

        match &self.context {
            Some(ctx) => log::debug!("$ {} [{}]", cmd_str, ctx),
            None => log::debug!("$ {}", cmd_str),
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        let t0 = Instant::now();
        let result = run_cancellable(&mut cmd);
        let duration_ms = t0.elapsed().as_secs_f64() * 1000.0;

        let ctx = self
            .context
            .as_deref()
            .map(|c| format!("context={c} "))
            .unwrap_or_default();
        match &result {
            Ok(output) => log::debug!(
                "[wt-trace] {}cmd=\"{}\" dur={:.1}ms ok={}",
                ctx,
                cmd_str,
                duration_ms,
                output.status.success()
            ),
            Err(e) => log::debug!(
                "[wt-trace] {}cmd=\"{}\" dur={:.1}ms err=\"{}\"",
                ctx,
                cmd_str,
                duration_ms,
                e
            ),
        }

        result
    }
}

/// Spawn `cmd`, drain its pipes on helper threads, and wait while polling for signals.
///
/// On Unix the child leads its own process group, so a forwarded signal also
/// reaches anything it spawned.
fn run_cancellable(cmd: &mut Command) -> std::io::Result<std::process::Output> {
    use std::io::Read;
    #[cfg(unix)]
    use std::os::unix::process::CommandExt;

    if let Some(sig) = received_signal() {
        return Err(std::io::Error::new(
            ErrorKind::Interrupted,
            format!("cancelled by signal {sig}"),
        ));
    }

    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Reader threads prevent a deadlock when the child fills a pipe buffer.
    let mut stdout_handle = child.stdout.take();
    let mut stderr_handle = child.stderr.take();
    let stdout_thread = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(handle) = stdout_handle.as_mut() {
            let _ = handle.read_to_end(&mut buf);
        }
        buf
    });
    let stderr_thread = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(handle) = stderr_handle.as_mut() {
            let _ = handle.read_to_end(&mut buf);
        }
        buf
    });

    let status = loop {
        if let Some(status) = child.wait_timeout(POLL_INTERVAL)? {
            break status;
        }
        if let Some(sig) = received_signal() {
            #[cfg(unix)]
            forward_signal_with_escalation(child.id() as i32, sig);
            #[cfg(not(unix))]
            let _ = child.kill();
            let _ = child.wait();
            let _ = stdout_thread.join();
            let _ = stderr_thread.join();
            return Err(std::io::Error::new(
                ErrorKind::Interrupted,
                format!("cancelled by signal {sig}"),
            ));
        }
    };

    let stdout = stdout_thread.join().unwrap_or_default();
    let stderr = stderr_thread.join().unwrap_or_default();
    Ok(std::process::Output {
        status,
        stdout,
        stderr,
    })
}

// ============================================================================
// Signal forwarding
// ============================================================================

#[cfg(unix)]
fn process_group_alive(pgid: i32) -> bool {
    match nix::sys::signal::killpg(nix::unistd::Pid::from_raw(pgid), None) {
        Ok(_) => true,
        Err(nix::errno::Errno::ESRCH) => false,
        Err(_) => true,
    }
}

#[cfg(unix)]
fn wait_for_exit(pgid: i32, grace: Duration) -> bool {
    std::thread::sleep(grace);
    !process_group_alive(pgid)
}

/// Send `sig` to the group, escalating if it does not exit within the grace period.
///
/// SIGINT escalates to SIGTERM then SIGKILL; SIGTERM escalates to SIGKILL.
#[cfg(unix)]
fn forward_signal_with_escalation(pgid: i32, sig: i32) {
    use nix::sys::signal::{Signal, killpg};
    use signal_hook::consts::{SIGINT, SIGTERM};

    let group = nix::unistd::Pid::from_raw(pgid);
    let initial = match sig {
        SIGINT => Signal::SIGINT,
        SIGTERM => Signal::SIGTERM,
        _ => return,
    };
    let _ = killpg(group, initial);

    let grace = Duration::from_millis(200);
    if sig == SIGINT && !wait_for_exit(pgid, grace) {
        let _ = killpg(group, Signal::SIGTERM);
    }
    if !wait_for_exit(pgid, grace) {
        let _ = killpg(group, Signal::SIGKILL);
    }
}

// ============================================================================
// Streaming execution (hooks)
// ============================================================================

/// Run `command` through the platform shell with its stdout routed to our stderr.
///
/// - stdin is null
/// - child stdout goes to our stderr at the OS level, child stderr is inherited
/// - on Unix the child gets its own process group, and SIGINT/SIGTERM are
///   forwarded to the whole group
///
/// A non-zero exit becomes [`WtError::ChildProcessExited`] with the child's
/// code; death by signal becomes 128 + signal. Cancellation becomes
/// [`WtError::Cancelled`].
pub fn execute_streaming(command: &str, working_dir: &Path) -> anyhow::Result<()> {
    #[cfg(unix)]
    use std::os::unix::process::CommandExt;

    check_cancelled()?;

    let shell = ShellConfig::get();
    let mut cmd = shell.command(command);
    #[cfg(unix)]
    cmd.process_group(0);

    log::debug!("$ {} [{}]", command, working_dir.display());

    let mut child = cmd
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(std::io::stderr()))
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| {
            anyhow::Error::from(GitError::Other {
                message: format!("Failed to execute command with {}: {}", shell.name, e),
            })
        })?;

    let wait_error = |e: std::io::Error| {
        anyhow::Error::from(GitError::Other {
            message: format!("Failed to wait for command: {}", e),
        })
    };

    let mut seen_signal = None;
    let status = loop {
        if let Some(status) = child.wait_timeout(POLL_INTERVAL).map_err(wait_error)? {
            break status;
        }
        if seen_signal.is_none()
            && let Some(sig) = received_signal()
        {
            seen_signal = Some(sig);
            #[cfg(unix)]
            forward_signal_with_escalation(child.id() as i32, sig);
            #[cfg(not(unix))]
            let _ = child.kill();
        }
    };

    if let Some(signal) = seen_signal {
        return Err(WtError::Cancelled { signal }.into());
    }

    #[cfg(unix)]
    if let Some(sig) = std::os::unix::process::ExitStatusExt::signal(&status) {
        return Err(WtError::ChildProcessExited {
            code: 128 + sig,
            message: format!("terminated by signal {}", sig),
        }
        .into());
    }

    if !status.success() {
        let code = status.code().unwrap_or(1);
        return Err(WtError::ChildProcessExited {
            code,
            message: format!("exit status: {}", code),
        }
        .into());
    }

    Ok(())
}
