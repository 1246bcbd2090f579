//! Raw-mode terminal over the process's stdin/stdout.
//!
//! Single-threaded by construction: stdin is switched to non-blocking and
//! drained from the UI timer, SIGWINCH only flips an atomic flag that the
//! same timer polls. No helper threads, no locks on the hot path.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::platform::terminal::Terminal;

#[cfg(unix)]
use libc::c_int;

#[cfg(unix)]
const ENTER_SEQUENCE: &str = "\x1b[?1049h\x1b[?25l\x1b[?2004h";
#[cfg(unix)]
const LEAVE_SEQUENCE: &str = "\x1b[?2004l\x1b[0m\x1b[?25h\x1b[?1049l";

#[cfg(unix)]
fn get_termios(fd: c_int) -> io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

#[cfg(unix)]
fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(unix)]
fn get_fd_flags(fd: c_int) -> io::Result<c_int> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(flags)
}

#[cfg(unix)]
fn set_fd_flags(fd: c_int, flags: c_int) -> io::Result<()> {
    let result = unsafe { libc::fcntl(fd, libc::F_SETFL, flags) };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(unix)]
fn read_winsize(fd: c_int) -> Option<(u16, u16)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some((size.ws_col, size.ws_row))
    } else {
        None
    }
}

#[cfg(unix)]
fn wait_writable(fd: c_int) -> io::Result<()> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        let result = unsafe { libc::poll(&mut fds, 1, -1) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result == 0 {
            continue;
        }
        if (fds.revents & libc::POLLOUT) != 0 {
            return Ok(());
        }
        return Err(io::Error::other(format!(
            "poll(POLLOUT) returned revents=0x{:x}",
            fds.revents
        )));
    }
}

/// Write every byte, retrying on EINTR and waiting out EAGAIN.
#[cfg(unix)]
fn write_all_fd(fd: c_int, bytes: &[u8]) -> io::Result<()> {
    let mut written = 0;
    while written < bytes.len() {
        let remaining = &bytes[written..];
        let result =
            unsafe { libc::write(fd, remaining.as_ptr() as *const libc::c_void, remaining.len()) };
        if result > 0 {
            written += result as usize;
            continue;
        }
        if result == 0 {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0"));
        }
        let err = io::Error::last_os_error();
        match err.kind() {
            io::ErrorKind::Interrupted => continue,
            io::ErrorKind::WouldBlock => wait_writable(fd)?,
            _ => return Err(err),
        }
    }
    Ok(())
}

/// Drain at most a screen's worth of pending bytes from a non-blocking fd.
#[cfg(unix)]
pub(crate) fn read_available_fd(fd: c_int) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut buffer = [0u8; 4096];
    loop {
        let read_len = unsafe { libc::read(fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };
        if read_len > 0 {
            out.extend_from_slice(&buffer[..read_len as usize]);
            continue;
        }
        if read_len == 0 {
            // EOF; whatever was drained still counts.
            return Ok(out);
        }
        let err = io::Error::last_os_error();
        match err.kind() {
            io::ErrorKind::Interrupted => continue,
            io::ErrorKind::WouldBlock => return Ok(out),
            _ => {
                if out.is_empty() {
                    return Err(err);
                }
                return Ok(out);
            }
        }
    }
}

#[cfg(unix)]
pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original_termios: Option<libc::termios>,
    original_stdin_flags: Option<c_int>,
    resize_flag: Arc<AtomicBool>,
    resize_signal: Option<signal_hook::SigId>,
    pending_output: String,
}

#[cfg(unix)]
impl ProcessTerminal {
    pub fn new() -> ProcessTerminal {
        ProcessTerminal {
            stdin_fd: libc::STDIN_FILENO,
            stdout_fd: libc::STDOUT_FILENO,
            original_termios: None,
            original_stdin_flags: None,
            resize_flag: Arc::new(AtomicBool::new(false)),
            resize_signal: None,
            pending_output: String::new(),
        }
    }

    #[cfg(test)]
    fn with_fds(stdin_fd: c_int, stdout_fd: c_int) -> ProcessTerminal {
        let mut terminal = ProcessTerminal::new();
        terminal.stdin_fd = stdin_fd;
        terminal.stdout_fd = stdout_fd;
        terminal
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if self.original_termios.is_none() {
            self.original_termios = Some(get_termios(self.stdin_fd)?);
        }
        let mut raw = match self.original_termios {
            Some(termios) => termios,
            None => return Err(io::Error::other("original termios missing")),
        };
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        set_termios(self.stdin_fd, &raw)
    }

    fn restore_raw_mode(&mut self) -> io::Result<()> {
        if let Some(original) = self.original_termios.take() {
            set_termios(self.stdin_fd, &original)?;
        }
        Ok(())
    }

    fn enable_nonblocking_stdin(&mut self) -> io::Result<()> {
        let flags = get_fd_flags(self.stdin_fd)?;
        self.original_stdin_flags = Some(flags);
        set_fd_flags(self.stdin_fd, flags | libc::O_NONBLOCK)
    }

    fn restore_stdin_flags(&mut self) -> io::Result<()> {
        if let Some(flags) = self.original_stdin_flags.take() {
            set_fd_flags(self.stdin_fd, flags)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
impl Default for ProcessTerminal {
    fn default() -> ProcessTerminal {
        ProcessTerminal::new()
    }
}

#[cfg(unix)]
impl Terminal for ProcessTerminal {
    fn start(&mut self) -> io::Result<()> {
        self.enable_raw_mode()?;
        if let Err(err) = self.enable_nonblocking_stdin() {
            let _ = self.restore_raw_mode();
            return Err(err);
        }

        self.resize_flag.store(false, Ordering::SeqCst);
        if self.resize_signal.is_none() {
            let flag = Arc::clone(&self.resize_flag);
            self.resize_signal = Some(signal_hook::flag::register(libc::SIGWINCH, flag)?);
        }

        write_all_fd(self.stdout_fd, ENTER_SEQUENCE.as_bytes())
    }

    fn stop(&mut self) -> io::Result<()> {
        if let Some(id) = self.resize_signal.take() {
            signal_hook::low_level::unregister(id);
        }

        if self.original_termios.is_some() {
            write_all_fd(self.stdout_fd, LEAVE_SEQUENCE.as_bytes())?;
        }

        // Drop pending keystrokes before leaving raw mode so they do not
        // leak into the shell.
        let _ = unsafe { libc::tcflush(self.stdin_fd, libc::TCIFLUSH) };

        self.restore_stdin_flags()?;
        self.restore_raw_mode()
    }

    fn read_available(&mut self) -> io::Result<String> {
        let bytes = read_available_fd(self.stdin_fd)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn write(&mut self, data: &str) {
        self.pending_output.push_str(data);
    }

    fn flush(&mut self) {
        if self.pending_output.is_empty() {
            return;
        }
        let data = std::mem::take(&mut self.pending_output);
        let _ = write_all_fd(self.stdout_fd, data.as_bytes());
    }

    fn columns(&self) -> u16 {
        read_winsize(self.stdout_fd)
            .map(|(cols, _)| cols)
            .unwrap_or(80)
    }

    fn rows(&self) -> u16 {
        read_winsize(self.stdout_fd)
            .map(|(_, rows)| rows)
            .unwrap_or(24)
    }

    fn poll_resize(&mut self) -> bool {
        self.resize_flag.swap(false, Ordering::SeqCst)
    }
}

#[cfg(unix)]
impl Drop for ProcessTerminal {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(not(unix))]
pub struct ProcessTerminal;

#[cfg(not(unix))]
impl ProcessTerminal {
    pub fn new() -> ProcessTerminal {
        ProcessTerminal
    }
}

#[cfg(not(unix))]
impl Terminal for ProcessTerminal {
    fn start(&mut self) -> io::Result<()> {
        Err(io::Error::other("ProcessTerminal requires a Unix platform"))
    }

    fn stop(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn read_available(&mut self) -> io::Result<String> {
        Ok(String::new())
    }

    fn write(&mut self, _data: &str) {}

    fn flush(&mut self) {}

    fn columns(&self) -> u16 {
        80
    }

    fn rows(&self) -> u16 {
        24
    }

    fn poll_resize(&mut self) -> bool {
        false
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::{read_available_fd, ProcessTerminal};
    use crate::platform::terminal::Terminal;
    use libc::c_int;

    struct Pty {
        master: c_int,
        slave: c_int,
    }

    impl Drop for Pty {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.master);
                libc::close(self.slave);
            }
        }
    }

    fn open_pty() -> Pty {
        let mut master: c_int = 0;
        let mut slave: c_int = 0;
        let result = unsafe {
            libc::openpty(
                &mut master,
                &mut slave,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(result, 0, "openpty failed");
        Pty { master, slave }
    }

    #[test]
    fn start_and_stop_restore_termios() {
        let pty = open_pty();
        let original = super::get_termios(pty.slave).expect("get termios");

        let mut terminal = ProcessTerminal::with_fds(pty.slave, pty.slave);
        terminal.start().expect("terminal start");

        let raw = super::get_termios(pty.slave).expect("get termios");
        assert_eq!(raw.c_lflag & libc::ICANON, 0, "raw mode not enabled");

        terminal.stop().expect("terminal stop");
        let restored = super::get_termios(pty.slave).expect("get termios");
        assert_eq!(
            restored.c_lflag & libc::ICANON,
            original.c_lflag & libc::ICANON,
            "raw mode not restored"
        );
    }

    #[test]
    fn read_available_returns_pending_bytes_without_blocking() {
        let pty = open_pty();
        let mut terminal = ProcessTerminal::with_fds(pty.slave, pty.slave);
        terminal.start().expect("terminal start");

        let payload = b"hi";
        let _ = unsafe {
            libc::write(
                pty.master,
                payload.as_ptr() as *const libc::c_void,
                payload.len(),
            )
        };
        // Give the kernel a moment to move bytes across the pty.
        std::thread::sleep(std::time::Duration::from_millis(50));

        let data = terminal.read_available().expect("read pending input");
        assert_eq!(data, "hi");
        let data = terminal.read_available().expect("read with empty queue");
        assert_eq!(data, "");

        terminal.stop().expect("terminal stop");
    }

    #[test]
    fn writes_are_buffered_until_flush() {
        let pty = open_pty();
        let mut terminal = ProcessTerminal::with_fds(pty.slave, pty.slave);

        terminal.write("abc");
        terminal.write("def");
        terminal.flush();

        let mut buf = [0u8; 64];
        let read_len =
            unsafe { libc::read(pty.master, buf.as_mut_ptr() as *mut _, buf.len()) };
        assert!(read_len > 0, "expected flushed bytes on the pty");
        assert_eq!(&buf[..read_len as usize], b"abcdef");
    }

    #[test]
    fn read_available_fd_reports_eof_as_empty() {
        let mut fds = [0 as c_int; 2];
        let result = unsafe { libc::pipe(fds.as_mut_ptr()) };
        assert_eq!(result, 0, "pipe failed");
        unsafe { libc::close(fds[1]) };

        let data = read_available_fd(fds[0]).expect("read eof");
        assert!(data.is_empty());
        unsafe { libc::close(fds[0]) };
    }
}
