//! Bridge runner (default binary).
//!
//! Drives the sandbox engine through a `PipeTerm`: every turn the state is
//! written to stdout as s-expression lines, then one key is read from stdin.
//! The session ends when stdin closes or the player quits.

use anyhow::{anyhow, Result};
use tracing::info;

use sil_term_bridge::config::BridgeConfig;
use sil_term_bridge::core::{KeyOutcome, PlayerOracle, SandboxEngine, Term, TermError, TermHook};
use sil_term_bridge::logging;
use sil_term_bridge::term::PipeTerm;
use sil_term_bridge::types::{KEY_QUEUE_SIZE, TERM_HEIGHT, TERM_WIDTH};

fn main() -> Result<()> {
    let config = BridgeConfig::from_env();
    let _log_guard = logging::init(&config.log_filter, config.log_path.as_deref())?;

    let mut engine = SandboxEngine::tutorial();
    let hook = PipeTerm::stdio(config.pipe_options());
    let mut term = Term::new(TERM_WIDTH, TERM_HEIGHT, KEY_QUEUE_SIZE, hook);

    info!(
        map_width = config.map_width,
        map_height = config.map_height,
        raw_strings = config.raw_strings,
        "bridge session started"
    );
    term.activate(&engine);

    let keys = run(&mut engine, &mut term)?;
    info!(keys, turn = engine.player_turn(), "bridge session ended");
    Ok(())
}

fn run<H: TermHook>(
    engine: &mut SandboxEngine,
    term: &mut Term<H>,
) -> Result<u64> {
    let mut keys = 0u64;
    loop {
        term.fresh(&*engine);

        let key = match term.inkey(&*engine, true) {
            Ok(Some(key)) => key,
            Ok(None) => continue,
            Err(TermError::InputClosed) => return Ok(keys),
            Err(e) => return Err(anyhow!(e)),
        };
        keys += 1;

        if engine.apply_key(key) == KeyOutcome::Quit {
            term.flush(&*engine);
            return Ok(keys);
        }
    }
}
