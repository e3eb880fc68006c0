use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use crossterm::ExecutableCommand;
use tracing::warn;

use crate::maze::Dir;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Arrow(Dir),
    /// Ctrl-C, a termination signal or a closed input stream.
    Interrupt,
    Other,
}

/// Blocking source of single keypresses.
pub trait InputSource {
    fn read_key(&mut self) -> io::Result<Key>;

    /// Drops keys that were typed ahead but not read yet.
    fn discard_pending(&mut self) {}
}

/// Raised from the signal handler on SIGINT, SIGTERM or SIGHUP.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    /// Routes process signals to this flag. Only one handler may exist per process.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let flag = self.clone();
        ctrlc::set_handler(move || flag.raise())
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Holds the terminal in raw mode with the cursor hidden until dropped.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn acquire() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(err) = io::stdout().execute(Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = io::stdout().execute(Show);
        if let Err(err) = terminal::disable_raw_mode() {
            warn!(%err, "failed to restore terminal mode");
        }
    }
}

pub struct RawKeys {
    _guard: RawModeGuard,
    interrupt: InterruptFlag,
}

impl InputSource for RawKeys {
    fn read_key(&mut self) -> io::Result<Key> {
        loop {
            if self.interrupt.is_raised() {
                return Ok(Key::Interrupt);
            }
            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(translate(key));
                }
            }
        }
    }
}

fn translate(key: KeyEvent) -> Key {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Interrupt,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Up => Key::Arrow(Dir::Up),
        KeyCode::Down => Key::Arrow(Dir::Down),
        KeyCode::Left => Key::Arrow(Dir::Left),
        KeyCode::Right => Key::Arrow(Dir::Right),
        _ => Key::Other,
    }
}

/// `None` marks end of input.
type LineMsg = io::Result<Option<String>>;

/// Line-buffered fallback: every character typed before Enter becomes a key,
/// an empty line is `Key::Other`, and end of input or a raised interrupt is
/// `Key::Interrupt`. Lines are read on a helper thread so a blocked read
/// never hides an interrupt.
pub struct LineKeys {
    lines: Receiver<LineMsg>,
    pending: VecDeque<char>,
    interrupt: InterruptFlag,
}

impl LineKeys {
    pub fn spawn<R>(mut reader: R, interrupt: InterruptFlag) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || loop {
            let mut line = String::new();
            let msg = match reader.read_line(&mut line) {
                Ok(0) => Ok(None),
                Ok(_) => Ok(Some(line)),
                Err(err) => Err(err),
            };
            let done = !matches!(msg, Ok(Some(_)));
            if tx.send(msg).is_err() || done {
                break;
            }
        });
        Self::from_channel(rx, interrupt)
    }

    fn from_channel(lines: Receiver<LineMsg>, interrupt: InterruptFlag) -> Self {
        Self {
            lines,
            pending: VecDeque::new(),
            interrupt,
        }
    }

    /// Next line, or `None` once input ended or an interrupt was raised.
    /// Lines already read win over a raised interrupt.
    fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            match self.lines.try_recv() {
                Ok(msg) => return msg,
                Err(TryRecvError::Disconnected) => return Ok(None),
                Err(TryRecvError::Empty) => {}
            }
            if self.interrupt.is_raised() {
                return Ok(None);
            }
            match self.lines.recv_timeout(POLL_INTERVAL) {
                Ok(msg) => return msg,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(None),
            }
        }
    }
}

impl InputSource for LineKeys {
    fn read_key(&mut self) -> io::Result<Key> {
        if let Some(c) = self.pending.pop_front() {
            return Ok(Key::Char(c));
        }
        let Some(line) = self.next_line()? else {
            return Ok(Key::Interrupt);
        };
        self.pending.extend(line.trim().chars());
        Ok(self.pending.pop_front().map_or(Key::Other, Key::Char))
    }

    fn discard_pending(&mut self) {
        self.pending.clear();
    }
}

/// Raw keyboard input when stdin is a terminal that allows it, line input
/// otherwise. Installs the process signal handler on first use.
pub fn open() -> Box<dyn InputSource> {
    let interrupt = InterruptFlag::default();
    if let Err(err) = interrupt.install() {
        warn!(%err, "no signal handler, signals will end the process");
    }

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        warn!("stdin is not a terminal, reading line by line");
        return Box::new(LineKeys::spawn(BufReader::new(stdin), interrupt));
    }
    match RawModeGuard::acquire() {
        Ok(guard) => Box::new(RawKeys {
            _guard: guard,
            interrupt,
        }),
        Err(err) => {
            warn!(%err, "raw mode unavailable, reading line by line");
            Box::new(LineKeys::spawn(BufReader::new(stdin), interrupt))
        }
    }
}

/// Replays a fixed list of keys, then reports a broken stream.
#[cfg(test)]
pub(crate) struct ScriptedKeys {
    keys: VecDeque<Key>,
}

#[cfg(test)]
impl ScriptedKeys {
    pub(crate) fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

#[cfg(test)]
impl InputSource for ScriptedKeys {
    fn read_key(&mut self) -> io::Result<Key> {
        self.keys
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

/// Line input fed by hand: returns the sender along with the source.
#[cfg(test)]
pub(crate) fn manual_lines(interrupt: InterruptFlag) -> (mpsc::Sender<LineMsg>, LineKeys) {
    let (tx, rx) = mpsc::channel();
    (tx, LineKeys::from_channel(rx, interrupt))
}
