//! Adapter module - engine state as line-oriented s-expressions
//!
//! The bridge talks to its front-end over a plain text pipe. Everything it
//! sends is one of three messages, each on its own line:
//!
//! ```text
//! (player-info :hp (28 30) :voice (12 15) :exp (150 1200) ... :gameturn 40)
//! (map 66 22 (("#" 2) ("." 1) ("@" 1) ...))
//! (inventory ("a Dagger (1d5)" "3 Flasks of Oil"))
//! ```
//!
//! # Module Structure
//!
//! - [`sexp`]: serde `Serializer` producing s-expressions, plus a small
//!   reader (`parse`) for the consumer side
//! - [`protocol`]: message structs, builders that read a [`GameOracle`], and
//!   `parse_message`
//! - [`serializer`]: `StateSerializer`, which writes whole lines and flushes
//!
//! # String Escaping
//!
//! Strings are escaped by default (`\"`, `\\`, `\n`, octal for other control
//! bytes). [`StringStyle::Raw`] writes them verbatim for consumers that
//! expect the old unescaped form.
//!
//! [`GameOracle`]: sil_bridge_core::GameOracle

pub mod protocol;
pub mod serializer;
pub mod sexp;

pub use sil_bridge_core as core;
pub use sil_bridge_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use serializer::{SerializerOptions, StateSerializer};
pub use sexp::{SexpError, StringStyle, Value};
