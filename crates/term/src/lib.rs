//! Terminal back-ends.
//!
//! Two sides of the same protocol live here:
//!
//! - [`dispatch`]: `PipeTerm`, the engine's terminal device when the display
//!   is another process. It answers extended operations by reading stdin
//!   and writing s-expression state lines to stdout.
//! - [`view`], [`fb`], [`renderer`]: the viewer that reads those lines and
//!   draws them. `FrameView` is pure and renders into a `FrameBuffer`;
//!   `TerminalRenderer` flushes the buffer with crossterm.

pub mod dispatch;
pub mod fb;
pub mod renderer;
pub mod view;

pub use sil_bridge_core as core;
pub use sil_bridge_types as types;

pub use dispatch::{PipeOptions, PipeTerm};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
pub use view::{FrameView, FrontState, Viewport};
