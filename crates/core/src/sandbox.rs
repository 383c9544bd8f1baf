//! A tiny stand-in engine.
//!
//! Just enough state to drive a terminal back-end without the real game: one
//! fixed room, a player who can walk around it, a pack and a song table.
//! There are no rules beyond "walls block".

use std::borrow::Cow;

use crate::oracle::{MapOracle, PackOracle, PlayerOracle};
use crate::snapshot::{CombatLine, Glyph, Meter, PlayerState, StatLine};
use crate::types::{Attr, Keypress, Point, SongId, MAP_HEIGHT, MAP_WIDTH, PACK_SLOTS};

const TUTORIAL_ROOM: [&str; 11] = [
    "   #################       ",
    "   #...............#       ",
    "   #.......~.......#########",
    "   #...............+.......#",
    "   #...!...........#.......#",
    "   #...............#...>...#",
    "   #.......=.......#.......#",
    "   #################.......#",
    "                   #.......#",
    "                   #########",
    "",
];

const TUTORIAL_SONGS: [(u8, &str); 4] = [
    (1, "Elbereth"),
    (2, "Slaying"),
    (3, "Silence"),
    (4, "Freedom"),
];

const TUTORIAL_PACK: [(usize, &str); 4] = [
    (0, "a Dagger (1d5)"),
    (1, "3 Flasks of Oil"),
    (3, "a Cloak [1]"),
    (4, "5 Arrows (1d7)"),
];

/// What the caller should do after a key has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

#[derive(Debug, Clone)]
pub struct SandboxEngine {
    rows: Vec<Vec<char>>,
    width: i32,
    height: i32,
    at: Point,
    origin: Point,
    player: PlayerState,
    race: String,
    house: String,
    songs: Vec<(u8, String)>,
    pack: Vec<Option<String>>,
    turn: i32,
    tables_ready: bool,
    pack_ready: bool,
}

impl SandboxEngine {
    /// The room the demo binary starts in.
    pub fn tutorial() -> Self {
        let mut engine = Self::from_rows(&TUTORIAL_ROOM, Point::new(6, 3))
            .with_world_size(i32::from(MAP_WIDTH), i32::from(MAP_HEIGHT));
        engine.player = tutorial_player();
        engine.race = "Noldor".to_string();
        engine.house = "Feanor".to_string();
        engine.songs = TUTORIAL_SONGS
            .iter()
            .map(|&(id, name)| (id, name.to_string()))
            .collect();
        for (slot, desc) in TUTORIAL_PACK {
            engine.pack[slot] = Some(desc.to_string());
        }
        engine
    }

    /// An engine whose map is `rows`, with the player standing at `at`.
    ///
    /// Spaces are unknown grids; `#` blocks movement. Everything else is
    /// drawn as-is.
    pub fn from_rows(rows: &[&str], at: Point) -> Self {
        let rows: Vec<Vec<char>> = rows.iter().map(|r| r.chars().collect()).collect();
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as i32;
        let height = rows.len() as i32;
        Self {
            rows,
            width,
            height,
            at,
            origin: Point::default(),
            player: PlayerState::default(),
            race: String::new(),
            house: String::new(),
            songs: Vec::new(),
            pack: vec![None; PACK_SLOTS],
            turn: 0,
            tables_ready: true,
            pack_ready: true,
        }
    }

    /// Grow the world past the drawn rows. The extra grids are unknown.
    pub fn with_world_size(mut self, width: i32, height: i32) -> Self {
        self.width = self.width.max(width);
        self.height = self.height.max(height);
        self
    }

    pub fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    pub fn position(&self) -> Point {
        self.at
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn set_tables_ready(&mut self, ready: bool) {
        self.tables_ready = ready;
    }

    pub fn set_pack_ready(&mut self, ready: bool) {
        self.pack_ready = ready;
    }

    pub fn set_names(&mut self, race: &str, house: &str) {
        self.race = race.to_string();
        self.house = house.to_string();
    }

    /// Replace a pack slot. Slots past the pack size are ignored.
    pub fn set_slot(&mut self, slot: usize, desc: Option<&str>) {
        if let Some(s) = self.pack.get_mut(slot) {
            *s = desc.map(str::to_string);
        }
    }

    /// Apply one keypress: walk, cycle songs, toggle stealth or quit.
    pub fn apply_key(&mut self, key: Keypress) -> KeyOutcome {
        if key == Keypress(b'Q') || key == Keypress::ctrl(b'x') {
            return KeyOutcome::Quit;
        }

        if let Some((dx, dy)) = direction(key) {
            let to = self.at.offset(dx, dy);
            if self.passable(to) {
                self.at = to;
                self.turn += 1;
            }
            return KeyOutcome::Continue;
        }

        match key.0 {
            b's' => self.cycle_songs(),
            b'S' => self.player.stealth_mode = !self.player.stealth_mode,
            _ => {}
        }
        KeyOutcome::Continue
    }

    fn cycle_songs(&mut self) {
        let p = &mut self.player;
        match (p.song1, p.song2) {
            (None, _) => p.song1 = Some(SongId(3)),
            (Some(_), None) => p.song2 = Some(SongId(2)),
            (Some(_), Some(_)) => {
                p.song1 = None;
                p.song2 = None;
            }
        }
    }

    fn cell(&self, at: Point) -> Option<char> {
        if at.x < 0 || at.y < 0 {
            return None;
        }
        self.rows
            .get(at.y as usize)
            .and_then(|row| row.get(at.x as usize))
            .copied()
    }

    fn passable(&self, at: Point) -> bool {
        matches!(self.cell(at), Some(c) if c != '#' && c != ' ')
    }
}

impl PlayerOracle for SandboxEngine {
    fn tables_ready(&self) -> bool {
        self.tables_ready
    }

    fn player(&self) -> &PlayerState {
        &self.player
    }

    fn race_name(&self) -> &str {
        &self.race
    }

    fn house_name(&self) -> &str {
        &self.house
    }

    fn song_name(&self, id: SongId) -> Option<&str> {
        self.songs
            .iter()
            .find(|(song, _)| *song == id.0)
            .map(|(_, name)| name.as_str())
    }

    fn player_turn(&self) -> i32 {
        self.turn
    }
}

impl MapOracle for SandboxEngine {
    fn viewport_origin(&self) -> Point {
        self.origin
    }

    fn in_bounds(&self, at: Point) -> bool {
        at.x >= 0 && at.y >= 0 && at.x < self.width && at.y < self.height
    }

    fn glyph(&self, at: Point) -> Glyph {
        if at == self.at {
            return Glyph::new('@', Attr::WHITE);
        }
        match self.cell(at) {
            None | Some(' ') => Glyph::blank(),
            Some('#') => Glyph::new('#', Attr::SLATE),
            Some('+') => Glyph::new('+', Attr::UMBER),
            Some('~') => Glyph::new('~', Attr::YELLOW),
            Some('!') => Glyph::new('!', Attr::L_BLUE),
            Some('=') => Glyph::new('=', Attr::L_GREEN),
            Some(c) => Glyph::new(c, Attr::WHITE),
        }
    }
}

impl PackOracle for SandboxEngine {
    fn pack_ready(&self) -> bool {
        self.pack_ready
    }

    fn describe_slot(&self, slot: usize) -> Option<Cow<'_, str>> {
        self.pack
            .get(slot)
            .and_then(|s| s.as_deref())
            .map(Cow::Borrowed)
    }
}

fn tutorial_player() -> PlayerState {
    PlayerState {
        hp: Meter::new(28, 30),
        voice: Meter::new(12, 15),
        exp: Meter::new(150, 1200),
        burden: Meter::new(212, 480),
        stats: [
            StatLine::new(2, 0, 0),
            StatLine::new(3, 0, 0),
            StatLine::new(1, -1, 0),
            StatLine::new(4, 0, 1),
        ],
        melee: CombatLine::new(5, 1, 5),
        archery: CombatLine::new(4, 1, 7),
        evasion: 3,
        song1: None,
        song2: None,
        poisoned: 0,
        stealth_mode: false,
        full_name: "Arakano".to_string(),
        depth: 1,
        age: 2500,
        height: 78,
        weight: 180,
    }
}

/// Roguelike and numeric-keypad directions.
fn direction(key: Keypress) -> Option<(i32, i32)> {
    match key.0 {
        b'h' | b'4' => Some((-1, 0)),
        b'l' | b'6' => Some((1, 0)),
        b'k' | b'8' => Some((0, -1)),
        b'j' | b'2' => Some((0, 1)),
        b'y' | b'7' => Some((-1, -1)),
        b'u' | b'9' => Some((1, -1)),
        b'b' | b'1' => Some((-1, 1)),
        b'n' | b'3' => Some((1, 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_walks_on_floor_and_stops_at_walls() {
        let mut e = SandboxEngine::tutorial();
        let start = e.position();

        assert_eq!(e.apply_key(Keypress(b'l')), KeyOutcome::Continue);
        assert_eq!(e.position(), start.offset(1, 0));
        assert_eq!(e.player_turn(), 1);

        // Two steps up from row 3 reaches the wall on row 0.
        e.apply_key(Keypress(b'k'));
        e.apply_key(Keypress(b'k'));
        let before = e.position();
        e.apply_key(Keypress(b'k'));
        assert_eq!(e.position(), before);
        assert_eq!(e.player_turn(), 3);
    }

    #[test]
    fn song_key_cycles_none_one_two() {
        let mut e = SandboxEngine::tutorial();
        e.apply_key(Keypress(b's'));
        assert_eq!(e.player().active_songs().len(), 1);
        e.apply_key(Keypress(b's'));
        assert_eq!(e.player().active_songs().len(), 2);
        e.apply_key(Keypress(b's'));
        assert!(e.player().active_songs().is_empty());
    }

    #[test]
    fn quit_keys_end_the_session() {
        let mut e = SandboxEngine::tutorial();
        assert_eq!(e.apply_key(Keypress(b'Q')), KeyOutcome::Quit);
        assert_eq!(e.apply_key(Keypress::ctrl(b'x')), KeyOutcome::Quit);
    }

    #[test]
    fn glyphs_show_player_and_unknown_grids() {
        let e = SandboxEngine::tutorial();
        assert_eq!(e.glyph(e.position()).ch, Some('@'));
        assert_eq!(e.glyph(Point::new(0, 0)), Glyph::blank());
        assert!(e.in_bounds(Point::new(0, 0)));
        assert!(!e.in_bounds(Point::new(-1, 0)));
        assert!(!e.in_bounds(Point::new(0, 40)));
    }

    #[test]
    fn tutorial_world_covers_the_map_viewport() {
        let e = SandboxEngine::tutorial();
        let far = Point::new(i32::from(MAP_WIDTH) - 1, i32::from(MAP_HEIGHT) - 1);
        assert!(e.in_bounds(far));
        assert_eq!(e.glyph(far), Glyph::blank());
        assert!(!e.in_bounds(far.offset(1, 0)));
    }

    #[test]
    fn songs_are_named_from_the_table() {
        let e = SandboxEngine::tutorial();
        assert_eq!(e.song_name(SongId(3)), Some("Silence"));
        assert_eq!(e.song_name(SongId(2)), Some("Slaying"));
        assert_eq!(e.song_name(SongId(99)), None);
    }
}
