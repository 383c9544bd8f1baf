//! State serializer - writes engine state to the front-end as text lines
//!
//! Every emit writes exactly one complete line and flushes, so a reader
//! never sees half a message. Player info goes first, then the map, then the
//! inventory; each is independent.

use std::io::Write;

use serde::Serialize;
use sil_bridge_core::GameOracle;
use sil_bridge_types::{MAP_HEIGHT, MAP_WIDTH};
use tracing::trace;

use crate::protocol::{build_inventory, build_map, build_player_info};
use crate::sexp::{self, Result, StringStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializerOptions {
    pub style: StringStyle,
    /// Viewport size of the `map` message.
    pub map_width: u16,
    pub map_height: u16,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            style: StringStyle::Escaped,
            map_width: MAP_WIDTH,
            map_height: MAP_HEIGHT,
        }
    }
}

/// Writes state messages to `W`, one line each.
pub struct StateSerializer<W> {
    out: W,
    options: SerializerOptions,
    buf: Vec<u8>,
}

impl<W: Write> StateSerializer<W> {
    pub fn new(out: W) -> Self {
        Self::with_options(out, SerializerOptions::default())
    }

    pub fn with_options(out: W, options: SerializerOptions) -> Self {
        Self {
            out,
            options,
            buf: Vec::with_capacity(4096),
        }
    }

    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Player status line. Returns `false` (and writes nothing) while the
    /// engine's tables are not loaded.
    pub fn emit_player(&mut self, oracle: &dyn GameOracle) -> Result<bool> {
        match build_player_info(oracle) {
            Some(msg) => {
                self.emit(&msg)?;
                Ok(true)
            }
            None => {
                trace!("player tables not ready, skipping player-info");
                Ok(false)
            }
        }
    }

    pub fn emit_map(&mut self, oracle: &dyn GameOracle) -> Result<()> {
        let msg = build_map(oracle, self.options.map_width, self.options.map_height);
        self.emit(&msg)
    }

    pub fn emit_inventory(&mut self, oracle: &dyn GameOracle) -> Result<()> {
        self.emit(&build_inventory(oracle))
    }

    /// Player info, map, inventory; stops at the first write error.
    pub fn emit_all(&mut self, oracle: &dyn GameOracle) -> Result<()> {
        self.emit_player(oracle)?;
        self.emit_map(oracle)?;
        self.emit_inventory(oracle)
    }

    fn emit<T: Serialize>(&mut self, msg: &T) -> Result<()> {
        // Build the whole line first so a serializer error never leaves a
        // partial line on the output.
        self.buf.clear();
        sexp::to_writer(&mut self.buf, msg, self.options.style)?;
        self.buf.push(b'\n');
        self.out.write_all(&self.buf)?;
        self.out.flush()?;
        Ok(())
    }
}

/// `player-info` line without the trailing newline.
pub fn player_line(oracle: &dyn GameOracle, style: StringStyle) -> Result<Option<String>> {
    build_player_info(oracle)
        .map(|msg| sexp::to_string(&msg, style))
        .transpose()
}

/// `map` line without the trailing newline.
pub fn map_line(
    oracle: &dyn GameOracle,
    width: u16,
    height: u16,
    style: StringStyle,
) -> Result<String> {
    sexp::to_string(&build_map(oracle, width, height), style)
}

/// `inventory` line without the trailing newline.
pub fn inventory_line(oracle: &dyn GameOracle, style: StringStyle) -> Result<String> {
    sexp::to_string(&build_inventory(oracle), style)
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::sexp::SexpError;
    use sil_bridge_core::SandboxEngine;
    use sil_bridge_types::{Point, SongId};

    fn emitted(engine: &SandboxEngine, options: SerializerOptions) -> String {
        let mut ser = StateSerializer::with_options(Vec::new(), options);
        ser.emit_all(engine).unwrap();
        String::from_utf8(ser.into_inner()).unwrap()
    }

    #[test]
    fn emit_all_writes_three_lines_in_order() {
        let out = emitted(&SandboxEngine::tutorial(), SerializerOptions::default());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("(player-info "));
        assert!(lines[1].starts_with("(map 66 22 ("));
        assert!(lines[2].starts_with("(inventory ("));
        assert!(out.ends_with(")\n"));
    }

    #[test]
    fn emit_all_skips_player_info_until_tables_load() {
        let mut e = SandboxEngine::tutorial();
        e.set_tables_ready(false);
        let out = emitted(&e, SerializerOptions::default());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("(map "));
    }

    #[test]
    fn two_song_example_line() {
        let mut e = SandboxEngine::tutorial();
        e.player_mut().song1 = Some(SongId(1));
        e.player_mut().song2 = Some(SongId(4));
        let line = player_line(&e, StringStyle::Escaped).unwrap().unwrap();
        assert!(line.contains(r#":song ("Elbereth" "Freedom") :poison 0 :stealth nil"#));
    }

    #[test]
    fn map_line_uses_configured_viewport() {
        let e = SandboxEngine::from_rows(&["..", ".."], Point::new(0, 0));
        let line = map_line(&e, 2, 2, StringStyle::Escaped).unwrap();
        assert_eq!(line, r#"(map 2 2 (("@" 1) ("." 1) ("." 1) ("." 1)))"#);

        let options = SerializerOptions {
            map_width: 1,
            map_height: 1,
            ..SerializerOptions::default()
        };
        let mut ser = StateSerializer::with_options(Vec::new(), options);
        ser.emit_map(&e).unwrap();
        assert_eq!(ser.get_ref().as_slice(), b"(map 1 1 ((\"@\" 1)))\n");
    }

    #[test]
    fn raw_style_writes_quotes_unescaped() {
        let mut e = SandboxEngine::from_rows(&["."], Point::new(0, 0));
        e.set_slot(0, Some("the \"Phial\""));
        let raw = inventory_line(&e, StringStyle::Raw).unwrap();
        assert_eq!(raw, r#"(inventory ("the "Phial""))"#);
        let escaped = inventory_line(&e, StringStyle::Escaped).unwrap();
        assert_eq!(escaped, r#"(inventory ("the \"Phial\""))"#);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_are_reported() {
        let mut ser = StateSerializer::new(FailingWriter);
        let err = ser.emit_inventory(&SandboxEngine::tutorial()).unwrap_err();
        assert!(matches!(err, SexpError::Io(_)));
    }
}
