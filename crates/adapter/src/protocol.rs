//! Protocol module - wire message types for the front-end
//!
//! Three independent messages, each one line:
//!
//! ```text
//! (player-info :hp (28 30) :voice (12 15) ... :gameturn 40)
//! (map 66 22 (("#" 2) ("." 1) ...))
//! (inventory ("a Dagger (1d5)" "a Cloak [1]"))
//! ```
//!
//! `build_*` turn engine state into messages; [`parse_message`] turns a line
//! back into a [`ParsedMessage`] on the consumer side.

use std::borrow::Cow;

use arrayvec::ArrayVec;
use serde::{Serialize, Serializer};
use sil_bridge_core::GameOracle;
use sil_bridge_types::{
    Attr, Stat, DEFAULT_ATTR, DESC_MAX, MAP_HEIGHT, MAP_WIDTH, PACK_SLOTS,
};
use tracing::debug;

use crate::sexp::{self, SexpError, Value};

pub const TAG_PLAYER_INFO: &str = "player-info";
pub const TAG_MAP: &str = "map";
pub const TAG_INVENTORY: &str = "inventory";

/// Cells reserved up front for a map line; larger viewports grow as needed.
const MAP_PREALLOC: usize = MAP_WIDTH as usize * MAP_HEIGHT as usize;

// ============== Bridge -> Front-end Messages ==============

/// Player status line.
///
/// Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename = "player-info")]
pub struct PlayerInfoMessage {
    pub hp: (i32, i32),
    pub voice: (i32, i32),
    pub exp: (i32, i32),
    pub burden: (i32, i32),
    #[serde(rename = "str")]
    pub strength: (i32, i32, i32),
    #[serde(rename = "dex")]
    pub dexterity: (i32, i32, i32),
    #[serde(rename = "con")]
    pub constitution: (i32, i32, i32),
    #[serde(rename = "gra")]
    pub grace: (i32, i32, i32),
    pub melee: (i32, i32, i32),
    pub archery: (i32, i32, i32),
    pub evasion: i32,
    pub song: SongList,
    pub poison: i32,
    pub stealth: bool,
    pub name: String,
    pub race: String,
    pub house: String,
    pub depth: i32,
    pub age: i32,
    pub height: i32,
    pub weight: i32,
    pub gameturn: i32,
}

/// Names of the active songs; written as `nil` when empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SongList(pub ArrayVec<String, 2>);

impl Serialize for SongList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_empty() {
            serializer.serialize_none()
        } else {
            self.0.as_slice().serialize(serializer)
        }
    }
}

/// Map viewport: width, height, then in-bounds cells in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename = "map")]
pub struct MapMessage(pub u16, pub u16, pub Vec<MapCell>);

impl MapMessage {
    pub fn width(&self) -> u16 {
        self.0
    }

    pub fn height(&self) -> u16 {
        self.1
    }

    pub fn cells(&self) -> &[MapCell] {
        &self.2
    }
}

/// One `("c" attr)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapCell {
    pub ch: char,
    pub attr: Attr,
}

impl MapCell {
    pub const fn new(ch: char, attr: Attr) -> Self {
        Self { ch, attr }
    }

    /// Placeholder for a grid the engine has no glyph for.
    pub const fn blank() -> Self {
        Self {
            ch: ' ',
            attr: DEFAULT_ATTR,
        }
    }
}

impl Serialize for MapCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.ch, self.attr.0).serialize(serializer)
    }
}

/// Occupied pack slots, in slot order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename = "inventory")]
pub struct InventoryMessage(pub Vec<String>);

// ============== Building Messages ==============

/// Player status, or `None` while the engine's tables are not loaded.
pub fn build_player_info(oracle: &dyn GameOracle) -> Option<PlayerInfoMessage> {
    if !oracle.tables_ready() {
        return None;
    }

    let p = oracle.player();

    let mut song = SongList::default();
    for id in p.active_songs() {
        match oracle.song_name(id) {
            Some(name) => song.0.push(name.to_string()),
            None => debug!(song = id.0, "active song has no table entry"),
        }
    }

    let stat = |s: Stat| {
        let line = p.stat(s);
        (line.value, line.drain, line.temp)
    };

    Some(PlayerInfoMessage {
        hp: (p.hp.cur, p.hp.max),
        voice: (p.voice.cur, p.voice.max),
        exp: (p.exp.cur, p.exp.max),
        burden: (p.burden.cur, p.burden.max),
        strength: stat(Stat::Str),
        dexterity: stat(Stat::Dex),
        constitution: stat(Stat::Con),
        grace: stat(Stat::Gra),
        melee: (p.melee.skill, p.melee.dice, p.melee.sides),
        archery: (p.archery.skill, p.archery.dice, p.archery.sides),
        evasion: p.evasion,
        song,
        poison: p.poisoned,
        stealth: p.stealth_mode,
        name: p.full_name.clone(),
        race: oracle.race_name().to_string(),
        house: oracle.house_name().to_string(),
        depth: p.depth,
        age: p.age,
        height: p.height,
        weight: p.weight,
        gameturn: oracle.player_turn(),
    })
}

/// Viewport of `width` x `height` grids from the engine's viewport origin.
///
/// Grids outside the world are left out entirely, so the cell count can be
/// smaller than `width * height`.
pub fn build_map(oracle: &dyn GameOracle, width: u16, height: u16) -> MapMessage {
    let origin = oracle.viewport_origin();
    let mut cells = Vec::with_capacity((width as usize * height as usize).min(MAP_PREALLOC));

    for oy in 0..height {
        for ox in 0..width {
            let at = origin.offset(i32::from(ox), i32::from(oy));
            if !oracle.in_bounds(at) {
                continue;
            }
            let glyph = oracle.glyph(at);
            cells.push(match glyph.ch {
                Some(ch) => MapCell::new(ch, glyph.attr),
                None => MapCell::blank(),
            });
        }
    }

    MapMessage(width, height, cells)
}

/// Descriptions of the occupied pack slots.
pub fn build_inventory(oracle: &dyn GameOracle) -> InventoryMessage {
    if !oracle.pack_ready() {
        return InventoryMessage::default();
    }

    let items = (0..PACK_SLOTS)
        .filter_map(|slot| oracle.describe_slot(slot))
        .map(clip_description)
        .collect();
    InventoryMessage(items)
}

fn clip_description(desc: Cow<'_, str>) -> String {
    match desc.char_indices().nth(DESC_MAX) {
        Some((cut, _)) => desc[..cut].to_string(),
        None => desc.into_owned(),
    }
}

// ============== Message Parsing ==============

/// Parsed bridge output line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    PlayerInfo(PlayerInfo),
    Map(MapFrame),
    Inventory(Vec<String>),
    /// Well-formed list with a tag this parser does not know.
    Unknown(String),
}

impl ParsedMessage {
    pub fn tag(&self) -> &str {
        match self {
            ParsedMessage::PlayerInfo(_) => TAG_PLAYER_INFO,
            ParsedMessage::Map(_) => TAG_MAP,
            ParsedMessage::Inventory(_) => TAG_INVENTORY,
            ParsedMessage::Unknown(tag) => tag,
        }
    }
}

/// Keyword/value pairs of a `player-info` message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerInfo {
    fields: Vec<(String, Value)>,
}

impl PlayerInfo {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_int()
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// `t` is true; `nil` or a missing key is false.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some(v) if !v.is_nil())
    }

    /// `(cur max)` pairs such as `:hp`.
    pub fn pair(&self, key: &str) -> Option<(i64, i64)> {
        match self.get(key)?.as_list()? {
            [a, b] => Some((a.as_int()?, b.as_int()?)),
            _ => None,
        }
    }

    /// Three-number lines such as `:str` or `:melee`.
    pub fn triple(&self, key: &str) -> Option<(i64, i64, i64)> {
        match self.get(key)?.as_list()? {
            [a, b, c] => Some((a.as_int()?, b.as_int()?, c.as_int()?)),
            _ => None,
        }
    }

    pub fn songs(&self) -> Vec<&str> {
        self.get("song")
            .and_then(Value::as_list)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Decoded `map` message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapFrame {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<MapCell>,
}

impl MapFrame {
    /// True when no grid was left out, so cell `i` sits at
    /// `(i % width, i / width)`.
    pub fn is_complete(&self) -> bool {
        self.cells.len() == self.width as usize * self.height as usize
    }
}

/// Parse one line of bridge output.
pub fn parse_message(line: &str) -> Result<ParsedMessage, SexpError> {
    let value = sexp::parse(line)?;
    let items = match &value {
        Value::List(items) => items.as_slice(),
        _ => return Err(SexpError::Malformed("top-level")),
    };
    let (tag, rest) = match items.split_first() {
        Some((Value::Symbol(tag), rest)) => (tag.as_str(), rest),
        _ => return Err(SexpError::Malformed("top-level")),
    };

    match tag {
        TAG_PLAYER_INFO => parse_player_info(rest).map(ParsedMessage::PlayerInfo),
        TAG_MAP => parse_map(rest).map(ParsedMessage::Map),
        TAG_INVENTORY => parse_inventory(rest).map(ParsedMessage::Inventory),
        other => Ok(ParsedMessage::Unknown(other.to_string())),
    }
}

fn parse_player_info(rest: &[Value]) -> Result<PlayerInfo, SexpError> {
    if rest.len() % 2 != 0 {
        return Err(SexpError::Malformed(TAG_PLAYER_INFO));
    }
    let mut fields = Vec::with_capacity(rest.len() / 2);
    for pair in rest.chunks_exact(2) {
        let key = pair[0]
            .as_symbol()
            .and_then(|k| k.strip_prefix(':'))
            .ok_or(SexpError::Malformed(TAG_PLAYER_INFO))?;
        fields.push((key.to_string(), pair[1].clone()));
    }
    Ok(PlayerInfo { fields })
}

fn parse_map(rest: &[Value]) -> Result<MapFrame, SexpError> {
    let bad = || SexpError::Malformed(TAG_MAP);
    let [w, h, cells] = rest else {
        return Err(bad());
    };
    let width = w.as_int().and_then(|v| u16::try_from(v).ok()).ok_or_else(bad)?;
    let height = h.as_int().and_then(|v| u16::try_from(v).ok()).ok_or_else(bad)?;

    let cells = cells
        .as_list()
        .ok_or_else(bad)?
        .iter()
        .map(|cell| match cell.as_list() {
            Some([ch, attr]) => {
                let ch = ch.as_str().and_then(|s| s.chars().next()).unwrap_or(' ');
                let attr = attr.as_int().and_then(|a| u8::try_from(a).ok()).ok_or_else(bad)?;
                Ok(MapCell::new(ch, Attr(attr)))
            }
            _ => Err(bad()),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MapFrame {
        width,
        height,
        cells,
    })
}

fn parse_inventory(rest: &[Value]) -> Result<Vec<String>, SexpError> {
    let bad = || SexpError::Malformed(TAG_INVENTORY);
    let [items] = rest else {
        return Err(bad());
    };
    items
        .as_list()
        .ok_or_else(bad)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(bad))
        .collect()
}
