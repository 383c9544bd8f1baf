//! S-expression terminal bridge (workspace facade crate).
//!
//! Re-exports the member crates under short names and holds the pieces the
//! two binaries share: configuration, logging setup and the viewer's process
//! plumbing.

pub use sil_bridge_adapter as adapter;
pub use sil_bridge_core as core;
pub use sil_bridge_input as input;
pub use sil_bridge_term as term;
pub use sil_bridge_types as types;

pub mod config;
pub mod front;
pub mod logging;
