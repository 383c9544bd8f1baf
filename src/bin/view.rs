//! Terminal front-end for the bridge.
//!
//! Starts `sil-bridge` as a child, draws whatever it reports and forwards
//! keypresses to it. Ctrl-C or the bridge exiting ends the session.

use std::sync::mpsc::TryRecvError;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};

use sil_term_bridge::config::BridgeConfig;
use sil_term_bridge::front::{parse_front_args, BridgeProcess, FrontEvent};
use sil_term_bridge::input::{key_to_byte, should_quit};
use sil_term_bridge::logging;
use sil_term_bridge::term::{FrameBuffer, FrameView, FrontState, TerminalRenderer, Viewport};
use sil_term_bridge::types::{TERM_HEIGHT, TERM_WIDTH};

const FRAME_POLL: Duration = Duration::from_millis(33);

fn main() -> Result<()> {
    let config = BridgeConfig::from_env();
    let _log_guard = match &config.log_path {
        Some(path) => logging::init(&config.log_filter, Some(path.as_path()))?,
        // stderr is the screen; without a log file stay quiet.
        None => None,
    };

    let front = parse_front_args(std::env::args_os().skip(1))?;
    let mut bridge = BridgeProcess::spawn(&front)
        .with_context(|| format!("starting {}", front.bridge.display()))?;

    let mut renderer = TerminalRenderer::new();
    renderer.enter("sil-view")?;

    let result = run(&mut renderer, &mut bridge);

    // Always try to restore terminal state.
    let _ = renderer.exit();
    let shutdown = bridge.shutdown();
    result?;
    shutdown?;
    Ok(())
}

fn run(renderer: &mut TerminalRenderer, bridge: &mut BridgeProcess) -> Result<()> {
    let view = FrameView::default();
    let mut state = FrontState::default();
    let mut fb = FrameBuffer::new(TERM_WIDTH, TERM_HEIGHT);
    let mut dirty = true;

    loop {
        loop {
            match bridge.events().try_recv() {
                Ok(FrontEvent::Message(msg)) => {
                    state.apply(msg);
                    dirty = true;
                }
                Ok(FrontEvent::BadLine(line)) => {
                    tracing::debug!(%line, "ignoring unparsable line");
                }
                Ok(FrontEvent::Closed) | Err(TryRecvError::Disconnected) => return Ok(()),
                Err(TryRecvError::Empty) => break,
            }
        }

        if dirty {
            let (w, h) = crossterm::terminal::size().unwrap_or((TERM_WIDTH, TERM_HEIGHT));
            view.render_into(&state, Viewport::new(w, h), &mut fb);
            renderer.draw_swap(&mut fb)?;
            dirty = false;
        }

        if !event::poll(FRAME_POLL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if should_quit(key) {
                    return Ok(());
                }
                if let Some(byte) = key_to_byte(key) {
                    bridge.send_key(byte)?;
                }
            }
            Event::Resize(_, _) => {
                renderer.invalidate();
                dirty = true;
            }
            _ => {}
        }
    }
}
