//! Read-only accessors the engine exposes to its display back-end.
//!
//! The engine owns all game state. A back-end only ever sees it through these
//! traits, so nothing here can mutate the game.

use std::borrow::Cow;

use crate::snapshot::{Glyph, PlayerState};
use crate::types::{Point, SongId};

/// Player record and the tables needed to name things in it.
pub trait PlayerOracle {
    /// False until the engine has loaded its race, house and song tables.
    ///
    /// Callers must not read player data while this is false.
    fn tables_ready(&self) -> bool;

    fn player(&self) -> &PlayerState;

    fn race_name(&self) -> &str;

    fn house_name(&self) -> &str;

    /// Name of song `id`, if the table has one.
    fn song_name(&self, id: SongId) -> Option<&str>;

    /// Number of player turns taken so far.
    fn player_turn(&self) -> i32;
}

/// Dungeon map as the player currently sees it.
pub trait MapOracle {
    /// World coordinate shown at the top-left of the map viewport.
    fn viewport_origin(&self) -> Point;

    fn in_bounds(&self, at: Point) -> bool;

    /// Glyph at an in-bounds location.
    fn glyph(&self, at: Point) -> Glyph;
}

/// The player's pack.
pub trait PackOracle {
    /// False while the inventory array has not been allocated.
    fn pack_ready(&self) -> bool;

    /// Full description of the object in `slot`, or `None` for an empty slot.
    fn describe_slot(&self, slot: usize) -> Option<Cow<'_, str>>;
}

/// Everything a terminal back-end may read.
pub trait GameOracle: PlayerOracle + MapOracle + PackOracle {}

impl<T: PlayerOracle + MapOracle + PackOracle + ?Sized> GameOracle for T {}
