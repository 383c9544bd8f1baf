//! Byte-level input sources for the bridge.
//!
//! The engine polls for one event at a time, sometimes without wanting to
//! block. Standard input cannot be polled portably, so [`ChannelInput`] reads
//! it on a background thread and hands bytes over a channel.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::{debug, warn};

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Byte(u8),
    /// Nothing pending (only when not waiting).
    Idle,
    /// End of input; every later poll also returns this.
    Closed,
}

pub trait InputSource {
    /// Next event. With `wait` set this blocks until a byte or end of input.
    fn next_event(&mut self, wait: bool) -> InputEvent;

    /// Throw away bytes that have arrived but not been read.
    /// Returns how many were dropped.
    fn discard_pending(&mut self) -> usize;
}

/// Reader thread plus channel.
pub struct ChannelInput {
    rx: Receiver<u8>,
    closed: bool,
}

impl ChannelInput {
    /// Start reading `reader` on a new thread.
    pub fn spawn<R: Read + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut reader = reader;
            let mut buf = [0u8; 256];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if buf[..n].iter().any(|&b| tx.send(b).is_err()) {
                            break;
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => {}
                    Err(e) => {
                        warn!(error = %e, "input read failed");
                        break;
                    }
                }
            }
            debug!("input reader finished");
        });
        Self { rx, closed: false }
    }

    /// Reader over the process's standard input.
    pub fn stdin() -> Self {
        Self::spawn(std::io::stdin())
    }

    fn close(&mut self) -> InputEvent {
        self.closed = true;
        InputEvent::Closed
    }
}

impl InputSource for ChannelInput {
    fn next_event(&mut self, wait: bool) -> InputEvent {
        if self.closed {
            return InputEvent::Closed;
        }
        if wait {
            match self.rx.recv() {
                Ok(b) => InputEvent::Byte(b),
                Err(_) => self.close(),
            }
        } else {
            match self.rx.try_recv() {
                Ok(b) => InputEvent::Byte(b),
                Err(TryRecvError::Empty) => InputEvent::Idle,
                Err(TryRecvError::Disconnected) => self.close(),
            }
        }
    }

    fn discard_pending(&mut self) -> usize {
        self.rx.try_iter().count()
    }
}

/// Fixed byte script, for tests and replays.
///
/// The script plays out in order; after the last byte the source reports
/// [`InputEvent::Closed`]. A non-waiting poll sees every byte as already
/// pending.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    bytes: VecDeque<u8>,
}

impl ScriptedInput {
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Self {
            bytes: bytes.as_ref().iter().copied().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl InputSource for ScriptedInput {
    fn next_event(&mut self, _wait: bool) -> InputEvent {
        match self.bytes.pop_front() {
            Some(b) => InputEvent::Byte(b),
            None => InputEvent::Closed,
        }
    }

    fn discard_pending(&mut self) -> usize {
        let n = self.bytes.len();
        self.bytes.clear();
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn scripted_input_plays_bytes_then_closes() {
        let mut src = ScriptedInput::new(b"ab");
        assert_eq!(src.next_event(true), InputEvent::Byte(b'a'));
        assert_eq!(src.next_event(false), InputEvent::Byte(b'b'));
        assert_eq!(src.next_event(true), InputEvent::Closed);
        assert_eq!(src.next_event(false), InputEvent::Closed);
    }

    #[test]
    fn scripted_discard_drops_everything() {
        let mut src = ScriptedInput::new(b"xyz");
        assert_eq!(src.discard_pending(), 3);
        assert_eq!(src.remaining(), 0);
    }

    #[test]
    fn channel_input_reads_until_eof() {
        let mut src = ChannelInput::spawn(Cursor::new(b"hi".to_vec()));
        assert_eq!(src.next_event(true), InputEvent::Byte(b'h'));
        assert_eq!(src.next_event(true), InputEvent::Byte(b'i'));
        assert_eq!(src.next_event(true), InputEvent::Closed);
        assert_eq!(src.next_event(false), InputEvent::Closed);
    }

    #[test]
    fn channel_input_does_not_block_without_wait() {
        let (_keep_open, rx) = mpsc::channel::<u8>();
        let mut src = ChannelInput { rx, closed: false };
        assert_eq!(src.next_event(false), InputEvent::Idle);
        assert_eq!(src.next_event(false), InputEvent::Idle);
    }

    #[test]
    fn channel_discard_drains_queued_bytes() {
        let (tx, rx) = mpsc::channel::<u8>();
        let mut src = ChannelInput { rx, closed: false };
        for b in b"abc" {
            tx.send(*b).unwrap();
        }
        assert_eq!(src.discard_pending(), 3);
        assert_eq!(src.next_event(false), InputEvent::Idle);
    }
}
