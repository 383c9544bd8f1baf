//! Core types module - shared vocabulary between the engine and the bridge
//!
//! This module defines the fundamental types used throughout the bridge.
//! All types are plain data with no external dependencies, so they can be
//! used by the engine-facing device, the wire protocol and the front-end alike.
//!
//! # Extended operations
//!
//! The engine talks to a terminal device through a fixed vocabulary of
//! "extended operation" codes:
//!
//! | Code | Operation | Meaning |
//! |------|-----------|---------|
//! | 1 | `Event` | Process (or wait for) one input event |
//! | 2 | `Flush` | Discard pending input events |
//! | 3 | `Clear` | Clear the screen |
//! | 4 | `Shape` | Set cursor visibility |
//! | 5 | `Frosh` | Flush one row of output |
//! | 6 | `Fresh` | Make all pending output visible |
//! | 7 | `Noise` | Make a noise |
//! | 8 | `Sound` | Play a sound |
//! | 9 | `Bored` | Idle hook |
//! | 10 | `React` | React to global setting changes |
//! | 11 | `Alive` | Change the "alive" state |
//! | 12 | `Level` | Change the "level" of the term |
//! | 13 | `Delay` | Delay for some milliseconds |
//!
//! # Dimensions
//!
//! - **Terminal**: 80x24 with a 256-key input queue
//! - **Map viewport**: 66x22, drawn at column 13, row 1 (left of it is the sidebar)
//! - **Pack**: 23 inventory slots
//!
//! # Examples
//!
//! ```
//! use sil_bridge_types::{Xtra, XtraStatus, Stat};
//!
//! assert_eq!(Xtra::from_code(6), Xtra::Fresh);
//! assert_eq!(Xtra::Fresh.code(), 6);
//! assert_eq!(Xtra::from_code(99), Xtra::Other(99));
//!
//! assert_eq!(XtraStatus::Handled.code(), 0);
//! assert_eq!(XtraStatus::InputClosed.code(), 1);
//!
//! assert_eq!(Stat::Gra.as_str(), "gra");
//! ```

/// Terminal width in columns
pub const TERM_WIDTH: u16 = 80;

/// Terminal height in rows
pub const TERM_HEIGHT: u16 = 24;

/// Capacity of the engine-side keypress queue
pub const KEY_QUEUE_SIZE: usize = 256;

/// First map row on the terminal
pub const ROW_MAP: u16 = 1;

/// First map column on the terminal (the sidebar sits to the left)
pub const COL_MAP: u16 = 13;

/// Map viewport width (terminal width minus sidebar and one spare column)
pub const MAP_WIDTH: u16 = TERM_WIDTH - COL_MAP - 1;

/// Map viewport height (terminal height minus top and bottom rows)
pub const MAP_HEIGHT: u16 = TERM_HEIGHT - ROW_MAP - 1;

/// Largest map viewport side a bridge will serve
pub const MAP_DIM_MAX: u16 = 255;

/// Number of inventory pack slots
pub const PACK_SLOTS: usize = 23;

/// Longest item description the engine produces (80-byte buffer minus terminator)
pub const DESC_MAX: usize = 79;

/// Colour attribute used for cells without a glyph
pub const DEFAULT_ATTR: Attr = Attr::WHITE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_constants_match_the_classic_screen() {
        assert_eq!(MAP_WIDTH, 66);
        assert_eq!(MAP_HEIGHT, 22);
        assert_eq!(DEFAULT_ATTR.0, 1);
    }

    #[test]
    fn xtra_codes_round_trip_through_integers() {
        for code in 1..=13 {
            assert_eq!(Xtra::from_code(code).code(), code);
            assert!(!matches!(Xtra::from_code(code), Xtra::Other(_)));
        }
        assert_eq!(Xtra::from_code(0), Xtra::Other(0));
        assert_eq!(Xtra::from_code(-4), Xtra::Other(-4));
    }

    #[test]
    fn only_handled_reports_zero() {
        assert!(XtraStatus::Handled.is_handled());
        assert_eq!(XtraStatus::Unhandled.code(), 1);
        assert_eq!(XtraStatus::InputClosed.code(), 1);
    }

    #[test]
    fn attr_masks_graphics_bits_for_palette_lookup() {
        assert_eq!(Attr(0x8B).color_index(), 11);
        assert_eq!(Attr(4).rgb(), COLOR_TABLE[4]);
    }
}

/// Extended operation codes issued by the engine to its terminal device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Xtra {
    /// Process some pending events (wait for one if the argument is non-zero)
    Event,
    /// Flush all pending events
    Flush,
    /// Clear the screen
    Clear,
    /// Set cursor shape/visibility
    Shape,
    /// Flush one row of output
    Frosh,
    /// Make all pending output visible
    Fresh,
    /// Make a noise
    Noise,
    /// Play a sound
    Sound,
    /// Idle hook while waiting for input
    Bored,
    /// React to global changes (colours, graphics mode)
    React,
    /// Change the "alive" state
    Alive,
    /// Change the "level" (activation) of the term
    Level,
    /// Delay for some milliseconds
    Delay,
    /// Any code outside the table above
    Other(i32),
}

impl Xtra {
    /// Decode an integer operation code.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Xtra::Event,
            2 => Xtra::Flush,
            3 => Xtra::Clear,
            4 => Xtra::Shape,
            5 => Xtra::Frosh,
            6 => Xtra::Fresh,
            7 => Xtra::Noise,
            8 => Xtra::Sound,
            9 => Xtra::Bored,
            10 => Xtra::React,
            11 => Xtra::Alive,
            12 => Xtra::Level,
            13 => Xtra::Delay,
            other => Xtra::Other(other),
        }
    }

    /// Integer operation code as the engine knows it.
    pub fn code(&self) -> i32 {
        match self {
            Xtra::Event => 1,
            Xtra::Flush => 2,
            Xtra::Clear => 3,
            Xtra::Shape => 4,
            Xtra::Frosh => 5,
            Xtra::Fresh => 6,
            Xtra::Noise => 7,
            Xtra::Sound => 8,
            Xtra::Bored => 9,
            Xtra::React => 10,
            Xtra::Alive => 11,
            Xtra::Level => 12,
            Xtra::Delay => 13,
            Xtra::Other(code) => *code,
        }
    }

    /// Lowercase name, used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Xtra::Event => "event",
            Xtra::Flush => "flush",
            Xtra::Clear => "clear",
            Xtra::Shape => "shape",
            Xtra::Frosh => "frosh",
            Xtra::Fresh => "fresh",
            Xtra::Noise => "noise",
            Xtra::Sound => "sound",
            Xtra::Bored => "bored",
            Xtra::React => "react",
            Xtra::Alive => "alive",
            Xtra::Level => "level",
            Xtra::Delay => "delay",
            Xtra::Other(_) => "other",
        }
    }
}

/// Result of an extended operation
///
/// The engine only sees the integer code: 0 when handled, 1 otherwise.
/// `InputClosed` is kept apart from `Unhandled` so Rust callers can tell
/// end-of-input from a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XtraStatus {
    Handled,
    Unhandled,
    InputClosed,
}

impl XtraStatus {
    pub fn code(&self) -> i32 {
        match self {
            XtraStatus::Handled => 0,
            XtraStatus::Unhandled | XtraStatus::InputClosed => 1,
        }
    }

    pub fn is_handled(&self) -> bool {
        matches!(self, XtraStatus::Handled)
    }
}

/// A raw keypress code as queued by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keypress(pub u8);

impl Keypress {
    pub const NEWLINE: Keypress = Keypress(b'\n');
    pub const RETURN: Keypress = Keypress(b'\r');
    pub const ESCAPE: Keypress = Keypress(0x1b);

    /// Control-modified letter (`ctrl('x')` is 0x18)
    pub const fn ctrl(letter: u8) -> Keypress {
        Keypress(letter & 0x1f)
    }
}

/// Colour attribute byte attached to a map glyph
///
/// The low four bits select one of the sixteen engine colours; higher bits
/// are used by graphical tile sets and are ignored for colour lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attr(pub u8);

impl Attr {
    pub const DARK: Attr = Attr(0);
    pub const WHITE: Attr = Attr(1);
    pub const SLATE: Attr = Attr(2);
    pub const ORANGE: Attr = Attr(3);
    pub const RED: Attr = Attr(4);
    pub const GREEN: Attr = Attr(5);
    pub const BLUE: Attr = Attr(6);
    pub const UMBER: Attr = Attr(7);
    pub const L_DARK: Attr = Attr(8);
    pub const L_WHITE: Attr = Attr(9);
    pub const VIOLET: Attr = Attr(10);
    pub const YELLOW: Attr = Attr(11);
    pub const L_RED: Attr = Attr(12);
    pub const L_GREEN: Attr = Attr(13);
    pub const L_BLUE: Attr = Attr(14);
    pub const L_UMBER: Attr = Attr(15);

    pub fn color_index(&self) -> usize {
        (self.0 & 0x0f) as usize
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        COLOR_TABLE[self.color_index()]
    }
}

/// Default RGB values for the sixteen engine colours
pub const COLOR_TABLE: [(u8, u8, u8); 16] = [
    (0, 0, 0),       // dark
    (255, 255, 255), // white
    (128, 128, 128), // slate
    (255, 128, 0),   // orange
    (192, 0, 0),     // red
    (0, 128, 64),    // green
    (0, 64, 255),    // blue
    (128, 64, 0),    // umber
    (96, 96, 96),    // light dark
    (192, 192, 192), // light white
    (255, 0, 255),   // violet
    (255, 255, 0),   // yellow
    (255, 64, 64),   // light red
    (0, 255, 0),     // light green
    (0, 255, 255),   // light blue
    (192, 128, 64),  // light umber
];

/// The four player attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Str,
    Dex,
    Con,
    Gra,
}

impl Stat {
    pub const ALL: [Stat; 4] = [Stat::Str, Stat::Dex, Stat::Con, Stat::Gra];

    pub fn index(&self) -> usize {
        match self {
            Stat::Str => 0,
            Stat::Dex => 1,
            Stat::Con => 2,
            Stat::Gra => 3,
        }
    }

    /// Short lowercase name, also the wire keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Str => "str",
            Stat::Dex => "dex",
            Stat::Con => "con",
            Stat::Gra => "gra",
        }
    }
}

/// Identifier of a song within the song skill category
///
/// The engine's "no song" sentinel is represented as `Option::None` at
/// the call sites, never as a `SongId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SongId(pub u8);

/// A map location in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}
