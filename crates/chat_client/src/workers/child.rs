//! Pipe-wired child process with non-blocking reads and bounded teardown.

use std::io::{self, Read, Write};
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// How long a SIGTERM gets before escalating to SIGKILL.
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

#[cfg(unix)]
fn set_nonblocking(fd: libc::c_int) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    let result = unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Drain a non-blocking stream without waiting for EOF.
fn read_available(stream: &mut impl Read) -> io::Result<String> {
    let mut out = Vec::new();
    let mut buffer = [0u8; 4096];
    loop {
        match stream.read(&mut buffer) {
            Ok(0) => break,
            Ok(count) => out.extend_from_slice(&buffer[..count]),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
            Err(err) => {
                if out.is_empty() {
                    return Err(err);
                }
                break;
            }
        }
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[derive(Debug)]
pub struct ChildHandle {
    child: Child,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
}

impl ChildHandle {
    /// Spawn `command` with all three stdio streams piped. If `payload` is
    /// given it is written to the child's stdin as one line; stdin is closed
    /// either way so the child sees EOF after reading it.
    pub fn spawn(command: &[String], payload: Option<&str>) -> io::Result<ChildHandle> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Some(payload) = payload {
                stdin.write_all(payload.as_bytes())?;
                stdin.write_all(b"\n")?;
            }
            // Dropping stdin here delivers EOF.
        }

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        #[cfg(unix)]
        {
            if let Some(stream) = &stdout {
                set_nonblocking(stream.as_raw_fd())?;
            }
            if let Some(stream) = &stderr {
                set_nonblocking(stream.as_raw_fd())?;
            }
        }

        Ok(ChildHandle {
            child,
            stdout,
            stderr,
        })
    }

    pub fn read_available_stdout(&mut self) -> io::Result<String> {
        match &mut self.stdout {
            Some(stream) => read_available(stream),
            None => Ok(String::new()),
        }
    }

    pub fn read_available_stderr(&mut self) -> io::Result<String> {
        match &mut self.stderr {
            Some(stream) => read_available(stream),
            None => Ok(String::new()),
        }
    }

    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// SIGTERM, a bounded wait, then SIGKILL if the child ignored it.
    pub fn terminate(&mut self) -> io::Result<()> {
        if !self.is_running() {
            return Ok(());
        }

        #[cfg(unix)]
        unsafe {
            libc::kill(self.child.id() as libc::pid_t, libc::SIGTERM);
        }

        match self.child.wait_timeout(TERMINATE_GRACE)? {
            Some(_) => Ok(()),
            None => {
                self.child.kill()?;
                self.child.wait()?;
                Ok(())
            }
        }
    }
}

impl Drop for ChildHandle {
    fn drop(&mut self) {
        let _ = self.terminate();
    }
}
