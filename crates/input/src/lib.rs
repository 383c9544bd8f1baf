//! Input module.
//!
//! Two directions of the same pipe:
//!
//! - [`source`]: where the bridge reads keypress bytes from (standard input
//!   on a reader thread, or a fixed script in tests)
//! - [`map`]: how the viewer turns `crossterm` key events into those bytes

pub mod map;
pub mod source;

pub use sil_bridge_types as types;

pub use map::{key_to_byte, should_quit};
pub use source::{ChannelInput, InputEvent, InputSource, ScriptedInput};
