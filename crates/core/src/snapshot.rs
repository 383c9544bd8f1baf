//! Read-only views of engine state handed to the bridge.
//!
//! These mirror the engine's player record field for field. They carry no
//! serialization concerns; the wire layout lives in the adapter crate.

use arrayvec::ArrayVec;

use crate::types::{Attr, SongId, Stat, DEFAULT_ATTR};

/// Current/maximum pair (hit points, voice, experience, burden).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Meter {
    pub cur: i32,
    pub max: i32,
}

impl Meter {
    pub const fn new(cur: i32, max: i32) -> Self {
        Self { cur, max }
    }
}

/// One attribute: value in use, drain, temporary modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatLine {
    pub value: i32,
    pub drain: i32,
    pub temp: i32,
}

impl StatLine {
    pub const fn new(value: i32, drain: i32, temp: i32) -> Self {
        Self { value, drain, temp }
    }
}

/// Combat line: skill score plus damage dice and sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CombatLine {
    pub skill: i32,
    pub dice: i32,
    pub sides: i32,
}

impl CombatLine {
    pub const fn new(skill: i32, dice: i32, sides: i32) -> Self {
        Self { skill, dice, sides }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PlayerState {
    pub hp: Meter,
    pub voice: Meter,
    /// `cur` is unspent experience, `max` is total experience earned.
    pub exp: Meter,
    /// `cur` is carried weight, `max` is the weight limit.
    pub burden: Meter,
    pub stats: [StatLine; 4],
    pub melee: CombatLine,
    pub archery: CombatLine,
    pub evasion: i32,
    pub song1: Option<SongId>,
    pub song2: Option<SongId>,
    pub poisoned: i32,
    pub stealth_mode: bool,
    pub full_name: String,
    pub depth: i32,
    pub age: i32,
    pub height: i32,
    pub weight: i32,
}

impl PlayerState {
    pub fn stat(&self, stat: Stat) -> StatLine {
        self.stats[stat.index()]
    }

    /// Active songs in engine order (primary first).
    pub fn active_songs(&self) -> ArrayVec<SongId, 2> {
        [self.song1, self.song2].into_iter().flatten().collect()
    }
}

/// What the engine shows at one map grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Glyph {
    pub attr: Attr,
    /// `None` when the engine has nothing to draw there.
    pub ch: Option<char>,
}

impl Glyph {
    pub const fn new(ch: char, attr: Attr) -> Self {
        Self { attr, ch: Some(ch) }
    }

    pub const fn blank() -> Self {
        Self {
            attr: DEFAULT_ATTR,
            ch: None,
        }
    }
}
