//! Front-end plumbing for `sil-view`: start the bridge as a child process,
//! read its output lines on a background thread, send keys back.

use std::env;
use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::adapter::{parse_message, ParsedMessage};
use crate::types::Keypress;

/// How long `shutdown` waits for the bridge to exit after closing its stdin.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);
const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum FrontError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),

    #[error("unknown argument: {0}")]
    UnknownArgument(String),

    #[error("cannot start bridge {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bridge process has no {0} pipe")]
    NoPipe(&'static str),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontConfig {
    pub bridge: PathBuf,
    pub bridge_args: Vec<OsString>,
}

impl Default for FrontConfig {
    fn default() -> Self {
        Self {
            bridge: default_bridge_path(),
            bridge_args: Vec::new(),
        }
    }
}

/// `sil-bridge` next to the running executable, or on `PATH`.
pub fn default_bridge_path() -> PathBuf {
    let name = format!("sil-bridge{}", env::consts::EXE_SUFFIX);
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
        .filter(|p| p.exists())
        .unwrap_or_else(|| PathBuf::from(name))
}

/// Parse viewer arguments (without the program name).
///
/// `--bridge <path>` picks the bridge binary; everything after `--` is
/// passed to the bridge untouched.
pub fn parse_front_args<I>(args: I) -> Result<FrontConfig, FrontError>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let mut config = FrontConfig::default();
    let mut args = args.into_iter().map(Into::into);

    while let Some(arg) = args.next() {
        match arg.to_str() {
            Some("--bridge") => {
                let path = args.next().ok_or(FrontError::MissingValue("--bridge"))?;
                config.bridge = PathBuf::from(path);
            }
            Some("--") => {
                config.bridge_args.extend(args.by_ref());
                break;
            }
            _ => return Err(FrontError::UnknownArgument(arg.to_string_lossy().into_owned())),
        }
    }

    Ok(config)
}

/// What the reader thread reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontEvent {
    Message(ParsedMessage),
    /// A line that did not parse; kept for display.
    BadLine(String),
    /// Bridge output ended.
    Closed,
}

/// Read `reader` line by line on a new thread, parsing each line.
pub fn read_messages<R: io::Read + Send + 'static>(reader: R) -> mpsc::Receiver<FrontEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let reader = BufReader::new(reader);
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "bridge read error");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let event = match parse_message(&line) {
                Ok(msg) => FrontEvent::Message(msg),
                Err(e) => {
                    debug!(error = %e, "unparsable bridge line");
                    FrontEvent::BadLine(line)
                }
            };
            if tx.send(event).is_err() {
                return;
            }
        }
        let _ = tx.send(FrontEvent::Closed);
    });
    rx
}

/// A running bridge child.
pub struct BridgeProcess {
    child: Child,
    stdin: ChildStdin,
    events: mpsc::Receiver<FrontEvent>,
}

impl BridgeProcess {
    pub fn spawn(config: &FrontConfig) -> Result<Self, FrontError> {
        let mut child = Command::new(&config.bridge)
            .args(&config.bridge_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| FrontError::Spawn {
                path: config.bridge.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(FrontError::NoPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(FrontError::NoPipe("stdout"))?;
        debug!(pid = child.id(), bridge = %config.bridge.display(), "bridge started");

        Ok(Self {
            child,
            stdin,
            events: read_messages(stdout),
        })
    }

    pub fn events(&self) -> &mpsc::Receiver<FrontEvent> {
        &self.events
    }

    /// Forward one keypress byte.
    pub fn send_key(&mut self, key: Keypress) -> Result<(), FrontError> {
        self.stdin.write_all(&[key.0])?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Close the bridge's input, give it [`SHUTDOWN_GRACE`] to exit, then
    /// kill it if it is still running. Returns how the bridge ended.
    pub fn shutdown(mut self) -> Result<ExitStatus, FrontError> {
        drop(self.stdin);

        let deadline = Instant::now() + SHUTDOWN_GRACE;
        while self.child.try_wait()?.is_none() {
            if Instant::now() >= deadline {
                warn!(pid = self.child.id(), "bridge did not exit, killing it");
                let _ = self.child.kill();
                break;
            }
            thread::sleep(SHUTDOWN_POLL);
        }

        let status = self.child.wait()?;
        debug!(%status, "bridge exited");
        Ok(status)
    }
}
