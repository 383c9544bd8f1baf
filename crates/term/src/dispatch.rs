//! PipeTerm: the terminal back-end that speaks to a front-end over a pipe.
//!
//! Input bytes come from an [`InputSource`]; state goes out through a
//! [`StateSerializer`]. The only state kept between calls is the input
//! stream position.

use std::io::{self, Write};

use sil_bridge_adapter::{SerializerOptions, StateSerializer};
use sil_bridge_core::{TermHook, XtraContext};
use sil_bridge_input::{ChannelInput, InputEvent, InputSource};
use sil_bridge_types::{Keypress, Xtra, XtraStatus};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipeOptions {
    /// Queue a bare newline as a keypress instead of treating it as
    /// "no event". Off keeps the classic protocol behaviour.
    pub forward_newline: bool,
    pub serializer: SerializerOptions,
}

pub struct PipeTerm<I, W> {
    input: I,
    out: StateSerializer<W>,
    forward_newline: bool,
}

impl PipeTerm<ChannelInput, io::Stdout> {
    /// Back-end over the process's standard input and output.
    pub fn stdio(options: PipeOptions) -> Self {
        Self::with_options(ChannelInput::stdin(), io::stdout(), options)
    }
}

impl<I: InputSource, W: Write> PipeTerm<I, W> {
    pub fn new(input: I, out: W) -> Self {
        Self::with_options(input, out, PipeOptions::default())
    }

    pub fn with_options(input: I, out: W, options: PipeOptions) -> Self {
        Self {
            input,
            out: StateSerializer::with_options(out, options.serializer),
            forward_newline: options.forward_newline,
        }
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn output(&self) -> &W {
        self.out.get_ref()
    }

    pub fn into_parts(self) -> (I, W) {
        (self.input, self.out.into_inner())
    }

    fn on_event(&mut self, ctx: &mut XtraContext<'_>, wait: bool) -> XtraStatus {
        match self.input.next_event(wait) {
            InputEvent::Idle => XtraStatus::Handled,
            InputEvent::Closed => {
                debug!("input closed");
                XtraStatus::InputClosed
            }
            InputEvent::Byte(b'\n') if !self.forward_newline => XtraStatus::Handled,
            InputEvent::Byte(b) => {
                if !ctx.keys.push(Keypress(b)) {
                    warn!(key = b, queued = ctx.keys.len(), "key queue full, dropping key");
                }
                XtraStatus::Handled
            }
        }
    }

    fn on_fresh(&mut self, ctx: &mut XtraContext<'_>) -> XtraStatus {
        if let Err(e) = self.out.emit_all(ctx.oracle) {
            warn!(error = %e, "failed to write state");
        }
        XtraStatus::Handled
    }
}

impl<I: InputSource, W: Write> TermHook for PipeTerm<I, W> {
    fn xtra(&mut self, ctx: &mut XtraContext<'_>, op: Xtra, v: i32) -> XtraStatus {
        match op {
            Xtra::Event => self.on_event(ctx, v != 0),
            Xtra::Flush => {
                let dropped = self.input.discard_pending();
                if dropped > 0 {
                    debug!(dropped, "flushed pending input");
                }
                XtraStatus::Handled
            }
            Xtra::Fresh => self.on_fresh(ctx),
            // Nothing to re-read: the palette is fixed on the front-end side.
            Xtra::React => XtraStatus::Handled,
            Xtra::Clear
            | Xtra::Shape
            | Xtra::Frosh
            | Xtra::Noise
            | Xtra::Sound
            | Xtra::Bored
            | Xtra::Alive
            | Xtra::Level
            | Xtra::Delay => XtraStatus::Handled,
            Xtra::Other(code) => {
                debug!(code, v, "unknown extended operation");
                XtraStatus::Unhandled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sil_bridge_core::{SandboxEngine, Term};
    use sil_bridge_input::ScriptedInput;

    fn term(script: &[u8], queue: usize) -> Term<PipeTerm<ScriptedInput, Vec<u8>>> {
        Term::new(80, 24, queue, PipeTerm::new(ScriptedInput::new(script), Vec::new()))
    }

    fn output(term: &Term<PipeTerm<ScriptedInput, Vec<u8>>>) -> String {
        String::from_utf8_lossy(term.hook().output()).into_owned()
    }

    #[test]
    fn event_forwards_one_byte_per_call() {
        let engine = SandboxEngine::tutorial();
        let mut t = term(b"ab", 16);

        assert_eq!(t.xtra(&engine, Xtra::Event, 1), XtraStatus::Handled);
        assert_eq!(t.keys().len(), 1);
        assert_eq!(t.xtra(&engine, Xtra::Event, 0), XtraStatus::Handled);
        let keys: Vec<u8> = t.keys().iter().map(|k| k.0).collect();
        assert_eq!(keys, b"ab");
    }

    #[test]
    fn newline_is_not_a_keypress() {
        let engine = SandboxEngine::tutorial();
        let mut t = term(b"\n", 16);
        assert_eq!(t.xtra(&engine, Xtra::Event, 1), XtraStatus::Handled);
        assert!(t.keys().is_empty());
    }

    #[test]
    fn newline_can_be_forwarded() {
        let engine = SandboxEngine::tutorial();
        let options = PipeOptions {
            forward_newline: true,
            ..PipeOptions::default()
        };
        let hook = PipeTerm::with_options(ScriptedInput::new(b"\n"), Vec::new(), options);
        let mut t = Term::new(80, 24, 16, hook);
        assert_eq!(t.inkey(&engine, true), Ok(Some(Keypress::NEWLINE)));
    }

    #[test]
    fn end_of_input_fails_without_a_key() {
        let engine = SandboxEngine::tutorial();
        let mut t = term(b"", 16);
        assert_eq!(t.xtra(&engine, Xtra::Event, 1), XtraStatus::InputClosed);
        assert_eq!(XtraStatus::InputClosed.code(), 1);
        assert!(t.keys().is_empty());
    }

    #[test]
    fn full_queue_drops_the_key() {
        let engine = SandboxEngine::tutorial();
        let mut t = term(b"xy", 1);
        t.xtra(&engine, Xtra::Event, 1);
        assert_eq!(t.xtra(&engine, Xtra::Event, 1), XtraStatus::Handled);
        assert_eq!(t.keys().len(), 1);
        assert_eq!(t.hook().input().remaining(), 0);
    }

    #[test]
    fn flush_discards_pending_input() {
        let engine = SandboxEngine::tutorial();
        let mut t = term(b"abc", 16);
        assert_eq!(t.xtra(&engine, Xtra::Flush, 0), XtraStatus::Handled);
        assert_eq!(t.hook().input().remaining(), 0);
        assert_eq!(t.xtra(&engine, Xtra::Event, 0), XtraStatus::InputClosed);
    }

    #[test]
    fn fresh_writes_three_lines() {
        let engine = SandboxEngine::tutorial();
        let mut t = term(b"", 16);
        assert_eq!(t.fresh(&engine), XtraStatus::Handled);
        let out = output(&t);
        let tags: Vec<&str> = out
            .lines()
            .map(|l| l.split(' ').next().unwrap_or(""))
            .collect();
        assert_eq!(tags, vec!["(player-info", "(map", "(inventory"]);
    }

    #[test]
    fn no_op_codes_are_handled_silently() {
        let engine = SandboxEngine::tutorial();
        let mut t = term(b"k", 16);
        for op in [
            Xtra::React,
            Xtra::Clear,
            Xtra::Shape,
            Xtra::Frosh,
            Xtra::Noise,
            Xtra::Sound,
            Xtra::Bored,
            Xtra::Alive,
            Xtra::Level,
            Xtra::Delay,
        ] {
            assert_eq!(t.xtra(&engine, op, 0), XtraStatus::Handled, "{op:?}");
        }
        assert!(output(&t).is_empty());
        assert_eq!(t.hook().input().remaining(), 1);
    }

    #[test]
    fn unknown_code_is_unhandled_and_silent() {
        let engine = SandboxEngine::tutorial();
        let mut t = term(b"", 16);
        let status = t.xtra(&engine, Xtra::from_code(99), 0);
        assert_eq!(status, XtraStatus::Unhandled);
        assert_eq!(status.code(), 1);
        assert!(output(&t).is_empty());
    }
}
