//! Process-backed terminal: raw mode over stdin/stdout with resize signals.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Once};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use libc::{self, c_int};
use signal_hook::iterator::Signals;
use tracing::warn;

use crate::config::TuiConfig;
use crate::core::terminal::Terminal;

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";
const POLL_INTERVAL_MS: c_int = 50;

type InputHandler = Arc<Mutex<Option<Box<dyn FnMut(String) + Send>>>>;
type ResizeHandler = Arc<Mutex<Option<Box<dyn FnMut() + Send>>>>;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_millis() as u64
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_all_fd(fd: c_int, bytes: &[u8]) -> std::io::Result<()> {
    let mut written = 0;
    while written < bytes.len() {
        let remaining = &bytes[written..];
        let result =
            unsafe { libc::write(fd, remaining.as_ptr() as *const libc::c_void, remaining.len()) };
        if result < 0 {
            let err = std::io::Error::last_os_error();
            match err.kind() {
                std::io::ErrorKind::Interrupted => continue,
                std::io::ErrorKind::WouldBlock => {
                    poll_fd(fd, libc::POLLOUT, -1);
                    continue;
                }
                _ => return Err(err),
            }
        }
        if result == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "write returned 0",
            ));
        }
        written += result as usize;
    }
    Ok(())
}

fn poll_fd(fd: c_int, events: libc::c_short, timeout_ms: c_int) -> bool {
    let mut fds = libc::pollfd {
        fd,
        events,
        revents: 0,
    };
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    result > 0 && (fds.revents & events) != 0
}

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

fn get_termios(fd: c_int) -> std::io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(termios)
}

fn set_termios(fd: c_int, termios: &libc::termios) -> std::io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
    if result != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Termios to restore if the process panics while raw mode is active.
static PANIC_RESTORE: Mutex<Option<(c_int, libc::termios)>> = Mutex::new(None);
static PANIC_HOOK: Once = Once::new();

fn install_panic_restore() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if let Some((fd, termios)) = lock_unpoisoned(&PANIC_RESTORE).take() {
                let _ = write_all_fd(libc::STDOUT_FILENO, b"\x1b[?2004l\x1b[?25h\x1b[?1049l");
                let _ = set_termios(fd, &termios);
            }
            previous(info);
        }));
    });
}

/// Reassembles bracketed pastes that arrive split across reads.
#[derive(Debug, Default)]
struct PasteAssembler {
    pending: Option<String>,
}

impl PasteAssembler {
    fn push(&mut self, chunk: &str) -> Option<String> {
        let mut buffered = match self.pending.take() {
            Some(mut pending) => {
                pending.push_str(chunk);
                pending
            }
            None => chunk.to_string(),
        };

        let open = buffered.rfind(PASTE_START);
        let closed = buffered.rfind(PASTE_END);
        let unterminated = match (open, closed) {
            (Some(open), Some(close)) => open > close,
            (Some(_), None) => true,
            _ => false,
        };

        if unterminated {
            self.pending = Some(std::mem::take(&mut buffered));
            return None;
        }
        Some(buffered)
    }
}

/// Holds back a multi-byte character cut off at the end of a read.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let complete = self.pending.len() - incomplete_suffix_len(&self.pending);
        let text = String::from_utf8_lossy(&self.pending[..complete]).into_owned();
        self.pending.drain(..complete);
        text
    }
}

fn incomplete_suffix_len(bytes: &[u8]) -> usize {
    let len = bytes.len();
    for start in (len.saturating_sub(3)..len).rev() {
        let byte = bytes[start];
        if byte & 0xC0 == 0x80 {
            continue;
        }
        let needed = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        let available = len - start;
        return if needed > available { available } else { 0 };
    }
    0
}

pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original_termios: Option<libc::termios>,
    input_handler: InputHandler,
    resize_handler: ResizeHandler,
    input_thread: Option<JoinHandle<()>>,
    stop_flag: Arc<AtomicBool>,
    drain_mode: Arc<AtomicBool>,
    last_input_time: Arc<AtomicU64>,
    write_log_path: Option<PathBuf>,
    write_log_failed: bool,
    resize_signal_handle: Option<signal_hook::iterator::Handle>,
    resize_thread: Option<JoinHandle<()>>,
}

impl ProcessTerminal {
    pub fn new(config: &TuiConfig) -> Self {
        Self {
            stdin_fd: libc::STDIN_FILENO,
            stdout_fd: libc::STDOUT_FILENO,
            original_termios: None,
            input_handler: Arc::new(Mutex::new(None)),
            resize_handler: Arc::new(Mutex::new(None)),
            input_thread: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            drain_mode: Arc::new(AtomicBool::new(false)),
            last_input_time: Arc::new(AtomicU64::new(now_ms())),
            write_log_path: config.write_log.clone(),
            write_log_failed: false,
            resize_signal_handle: None,
            resize_thread: None,
        }
    }

    fn enable_raw_mode(&mut self) -> std::io::Result<()> {
        let original = match self.original_termios {
            Some(original) => original,
            None => {
                let original = get_termios(self.stdin_fd)?;
                self.original_termios = Some(original);
                original
            }
        };

        let mut raw = original;
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        set_termios(self.stdin_fd, &raw)?;

        install_panic_restore();
        *lock_unpoisoned(&PANIC_RESTORE) = Some((self.stdin_fd, original));
        Ok(())
    }

    fn restore_raw_mode(&mut self) -> std::io::Result<()> {
        lock_unpoisoned(&PANIC_RESTORE).take();
        if let Some(original) = self.original_termios.as_ref() {
            set_termios(self.stdin_fd, original)?;
        }
        Ok(())
    }

    fn start_input_thread(&mut self) -> std::io::Result<()> {
        let stdin_fd = self.stdin_fd;
        let input_handler = Arc::clone(&self.input_handler);
        let stop_flag = Arc::clone(&self.stop_flag);
        let drain_mode = Arc::clone(&self.drain_mode);
        let last_input_time = Arc::clone(&self.last_input_time);

        let handle = thread::Builder::new()
            .name("terminal-input".to_string())
            .spawn(move || {
                let mut buffer = [0u8; 4096];
                let mut pastes = PasteAssembler::default();
                let mut decoder = Utf8Decoder::default();

                while !stop_flag.load(Ordering::SeqCst) {
                    if !poll_fd(stdin_fd, libc::POLLIN, POLL_INTERVAL_MS) {
                        continue;
                    }
                    let read_len = unsafe {
                        libc::read(stdin_fd, buffer.as_mut_ptr() as *mut libc::c_void, buffer.len())
                    };
                    if read_len <= 0 {
                        continue;
                    }
                    last_input_time.store(now_ms(), Ordering::SeqCst);
                    if drain_mode.load(Ordering::SeqCst) {
                        continue;
                    }

                    let chunk = decoder.push(&buffer[..read_len as usize]);
                    if chunk.is_empty() {
                        continue;
                    }
                    let Some(data) = pastes.push(&chunk) else {
                        continue;
                    };
                    if let Some(handler) = lock_unpoisoned(&input_handler).as_mut() {
                        handler(data);
                    }
                }
            })?;
        self.input_thread = Some(handle);
        Ok(())
    }

    fn stop_input_thread(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.input_thread.take() {
            let _ = handle.join();
        }
    }

    fn start_resize_thread(&mut self) -> std::io::Result<()> {
        let mut signals = Signals::new([libc::SIGWINCH])?;
        let handle = signals.handle();
        let resize_handler = Arc::clone(&self.resize_handler);

        let thread = thread::Builder::new()
            .name("terminal-resize".to_string())
            .spawn(move || {
                for _ in signals.forever() {
                    if let Some(handler) = lock_unpoisoned(&resize_handler).as_mut() {
                        handler();
                    }
                }
            })?;

        self.resize_signal_handle = Some(handle);
        self.resize_thread = Some(thread);
        Ok(())
    }

    fn stop_resize_thread(&mut self) {
        if let Some(handle) = self.resize_signal_handle.take() {
            handle.close();
        }
        if let Some(thread) = self.resize_thread.take() {
            let _ = thread.join();
        }
    }

    fn clear_handlers(&mut self) {
        *lock_unpoisoned(&self.input_handler) = None;
        *lock_unpoisoned(&self.resize_handler) = None;
    }
}

impl Terminal for ProcessTerminal {
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> std::io::Result<()> {
        *lock_unpoisoned(&self.input_handler) = Some(on_input);
        *lock_unpoisoned(&self.resize_handler) = Some(on_resize);

        self.stop_flag.store(false, Ordering::SeqCst);
        self.drain_mode.store(false, Ordering::SeqCst);
        self.last_input_time.store(now_ms(), Ordering::SeqCst);

        if let Err(err) = self.enable_raw_mode() {
            self.clear_handlers();
            return Err(err);
        }

        if let Err(err) = self
            .start_resize_thread()
            .and_then(|()| self.start_input_thread())
        {
            self.stop_resize_thread();
            self.clear_handlers();
            let _ = self.restore_raw_mode();
            return Err(err);
        }

        Ok(())
    }

    fn stop(&mut self) -> std::io::Result<()> {
        self.stop_input_thread();
        self.stop_resize_thread();
        self.clear_handlers();

        // Flush input before leaving raw mode so buffered bytes don't reach the shell.
        let _ = unsafe { libc::tcflush(self.stdin_fd, libc::TCIFLUSH) };

        self.restore_raw_mode()
    }

    fn drain_input(&mut self, max_ms: u64, idle_ms: u64) {
        self.drain_mode.store(true, Ordering::SeqCst);
        self.last_input_time.store(now_ms(), Ordering::SeqCst);

        let end_time = now_ms().saturating_add(max_ms);
        loop {
            let now = now_ms();
            if now >= end_time {
                break;
            }
            let last_input = self.last_input_time.load(Ordering::SeqCst);
            if now.saturating_sub(last_input) >= idle_ms {
                break;
            }

            let remaining = end_time.saturating_sub(now);
            thread::sleep(Duration::from_millis(idle_ms.min(remaining).max(1)));
        }

        self.drain_mode.store(false, Ordering::SeqCst);
    }

    fn write(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        if let Err(err) = write_all_fd(self.stdout_fd, data.as_bytes()) {
            warn!(error = %err, "terminal write failed");
        }
        if self.write_log_failed {
            return;
        }
        if let Some(path) = self.write_log_path.as_ref() {
            let result = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(data.as_bytes()));
            if let Err(err) = result {
                warn!(path = %path.display(), error = %err, "disabling terminal write log");
                self.write_log_failed = true;
            }
        }
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
}
