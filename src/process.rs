use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{TarteelError, TarteelResult};

#[must_use]
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

pub fn run_command(program: &str, args: &[String], cwd: Option<&Path>) -> TarteelResult<Output> {
    run_command_with_timeout(program, args, cwd, None)
}

/// Run a subprocess with piped output and an optional wall-clock limit.
///
/// The child is killed once the limit elapses. Output pipes are drained on
/// dedicated threads so a chatty child cannot deadlock against a full pipe
/// buffer while we poll `try_wait`.
pub fn run_command_with_timeout(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
    timeout: Option<Duration>,
) -> TarteelResult<Output> {
    if !command_exists(program) {
        return Err(TarteelError::CommandMissing {
            command: program.to_owned(),
        });
    }

    let rendered = format!("{} {}", program, args.join(" "));
    let mut command = Command::new(program);
    command.args(args);
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let Some(limit) = timeout else {
        let output = command.output()?;
        return validate_command_output(&rendered, output);
    };

    let mut child = command.spawn()?;
    let started_at = Instant::now();

    let mut stdout_pipe = child.stdout.take().expect("stdout piped");
    let mut stderr_pipe = child.stderr.take().expect("stderr piped");

    let (stdout_tx, stdout_rx) = std::sync::mpsc::channel();
    let (stderr_tx, stderr_rx) = std::sync::mpsc::channel();

    thread::spawn(move || {
        use std::io::Read;
        let mut buf = Vec::new();
        let _ = stdout_pipe.read_to_end(&mut buf);
        let _ = stdout_tx.send(buf);
    });

    thread::spawn(move || {
        use std::io::Read;
        let mut buf = Vec::new();
        let _ = stderr_pipe.read_to_end(&mut buf);
        let _ = stderr_tx.send(buf);
    });

    loop {
        if let Some(status) = child.try_wait()? {
            let stdout = stdout_rx
                .recv_timeout(Duration::from_millis(100))
                .unwrap_or_default();
            let stderr = stderr_rx
                .recv_timeout(Duration::from_millis(100))
                .unwrap_or_default();
            return validate_command_output(
                &rendered,
                Output {
                    status,
                    stdout,
                    stderr,
                },
            );
        }

        if started_at.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            let stderr = stderr_rx
                .recv_timeout(Duration::from_millis(100))
                .unwrap_or_default();
            let stderr_str = String::from_utf8_lossy(&stderr).into_owned();
            return Err(TarteelError::from_command_timeout(
                rendered,
                saturating_duration_ms(limit),
                stderr_str,
            ));
        }

        thread::sleep(Duration::from_millis(20));
    }
}

fn validate_command_output(rendered: &str, output: Output) -> TarteelResult<Output> {
    if output.status.success() {
        return Ok(output);
    }

    let status = output.status.code().unwrap_or(-1);
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    Err(TarteelError::from_command_failure(
        rendered.to_owned(),
        status,
        stderr,
    ))
}

fn saturating_duration_ms(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{
        command_exists, run_command, run_command_with_timeout, saturating_duration_ms,
        validate_command_output,
    };
    use crate::error::TarteelError;

    #[test]
    fn succeeds_for_true() {
        let output = run_command("true", &[], None).expect("true should succeed");
        assert!(output.status.success());
    }

    #[test]
    fn missing_program_is_command_missing() {
        let err = run_command("nonexistent_binary_xyz_12345", &[], None)
            .expect_err("nonexistent binary should fail");
        assert!(
            matches!(err, TarteelError::CommandMissing { .. }),
            "expected CommandMissing, got: {err:?}"
        );
    }

    #[test]
    fn nonzero_exit_carries_stderr() {
        let err = run_command("ls", &["/nonexistent_path_xyz_99999".to_owned()], None)
            .expect_err("ls on nonexistent should fail");
        let text = err.to_string();
        assert!(
            text.contains("nonexistent_path") || text.contains("No such file"),
            "expected stderr content, got: {text}"
        );
    }

    #[test]
    fn timeout_kills_slow_command() {
        let err = run_command_with_timeout(
            "sleep",
            &["60".to_owned()],
            None,
            Some(Duration::from_millis(100)),
        )
        .expect_err("should timeout");
        assert_eq!(err.error_code(), "TR-CMD-TIMEOUT");
    }

    #[test]
    fn fast_command_finishes_within_timeout() {
        let output = run_command_with_timeout(
            "echo",
            &["hello".to_owned()],
            None,
            Some(Duration::from_secs(5)),
        )
        .expect("echo should succeed within timeout");
        assert!(String::from_utf8_lossy(&output.stdout).contains("hello"));
    }

    #[test]
    fn cwd_is_respected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = run_command("pwd", &[], Some(dir.path())).expect("pwd should succeed");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains(dir.path().to_str().unwrap()),
            "expected cwd in stdout, got: {stdout}"
        );
    }

    #[test]
    fn command_exists_checks_path() {
        assert!(command_exists("ls"));
        assert!(!command_exists("definitely_not_a_real_binary_abc_xyz_99999"));
    }

    #[test]
    fn saturating_duration_ms_clamps() {
        assert_eq!(saturating_duration_ms(Duration::from_secs(5)), 5000);
        assert_eq!(saturating_duration_ms(Duration::ZERO), 0);
        assert_eq!(saturating_duration_ms(Duration::from_secs(u64::MAX)), u64::MAX);
    }

    #[test]
    fn validate_output_reports_exit_code_and_stderr() {
        use std::os::unix::process::ExitStatusExt;
        use std::process::ExitStatus;

        let output = std::process::Output {
            status: ExitStatus::from_raw(42 << 8),
            stdout: Vec::new(),
            stderr: b"something went wrong".to_vec(),
        };
        let text = validate_command_output("my-tool --flag", output)
            .unwrap_err()
            .to_string();
        assert!(text.contains("my-tool"), "should name the command: {text}");
        assert!(text.contains("42"), "should carry the exit code: {text}");
        assert!(text.contains("something went wrong"));
    }
}
