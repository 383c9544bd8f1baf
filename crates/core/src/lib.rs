//! Engine-facing side of the bridge
//!
//! This crate is the contract between a turn-based game engine and whatever
//! displays it. It has **no I/O** of its own:
//!
//! - **Oracles**: read-only traits the engine implements so a back-end can
//!   look at player, map and pack state without being able to change it
//! - **Snapshots**: plain copies of the engine's player record and map glyphs
//! - **Term**: the engine's generic terminal device, holding the keypress
//!   queue and one [`TermHook`] back-end that receives extended operations
//! - **Sandbox**: a stand-in engine with one room, used by the demo binary
//!   and by tests
//!
//! # Module Structure
//!
//! - [`oracle`]: `PlayerOracle`, `MapOracle`, `PackOracle` and their union `GameOracle`
//! - [`snapshot`]: `PlayerState`, `Meter`, `StatLine`, `CombatLine`, `Glyph`
//! - [`term`]: `Term`, `TermHook`, `XtraContext`, `KeyQueue`
//! - [`sandbox`]: `SandboxEngine`
//!
//! # Example
//!
//! ```
//! use sil_bridge_core::{SandboxEngine, Term, TermHook, XtraContext};
//! use sil_bridge_core::types::{Keypress, Xtra, XtraStatus};
//!
//! /// A back-end that answers every event with the same key.
//! struct Always(u8);
//!
//! impl TermHook for Always {
//!     fn xtra(&mut self, ctx: &mut XtraContext<'_>, op: Xtra, _v: i32) -> XtraStatus {
//!         if op == Xtra::Event {
//!             ctx.keys.push(Keypress(self.0));
//!         }
//!         XtraStatus::Handled
//!     }
//! }
//!
//! let engine = SandboxEngine::tutorial();
//! let mut term = Term::new(80, 24, 256, Always(b'l'));
//! assert_eq!(term.inkey(&engine, true), Ok(Some(Keypress(b'l'))));
//! ```

pub mod oracle;
pub mod sandbox;
pub mod snapshot;
pub mod term;

pub use sil_bridge_types as types;

pub use oracle::{GameOracle, MapOracle, PackOracle, PlayerOracle};
pub use sandbox::{KeyOutcome, SandboxEngine};
pub use snapshot::{CombatLine, Glyph, Meter, PlayerState, StatLine};
pub use term::{KeyQueue, Term, TermError, TermHook, XtraContext};
