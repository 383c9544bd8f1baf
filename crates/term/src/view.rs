//! FrameView: maps the latest bridge messages into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! Layout follows the engine's own screen: a 13-column sidebar on the left,
//! the map from column 13 row 1, a status line at the bottom. When the
//! terminal is wider than the map, the inventory goes in a panel on the right.

use sil_bridge_adapter::{MapFrame, ParsedMessage, PlayerInfo};
use sil_bridge_types::{Attr, Stat, COL_MAP, ROW_MAP};

use crate::fb::{CellStyle, FrameBuffer};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Latest message of each kind received from the bridge.
#[derive(Debug, Clone, Default)]
pub struct FrontState {
    pub player: Option<PlayerInfo>,
    pub map: Option<MapFrame>,
    pub inventory: Vec<String>,
    /// Tag of the most recent message the viewer did not understand.
    pub last_unknown: Option<String>,
    pub received: u64,
}

impl FrontState {
    pub fn apply(&mut self, msg: ParsedMessage) {
        self.received += 1;
        match msg {
            ParsedMessage::PlayerInfo(info) => self.player = Some(info),
            ParsedMessage::Map(frame) => self.map = Some(frame),
            ParsedMessage::Inventory(items) => self.inventory = items,
            ParsedMessage::Unknown(tag) => self.last_unknown = Some(tag),
        }
    }
}

const SIDEBAR_W: u16 = COL_MAP - 1;
const INVENTORY_MIN_W: u16 = 16;

pub struct FrameView {
    label: CellStyle,
    value: CellStyle,
}

impl Default for FrameView {
    fn default() -> Self {
        Self {
            label: CellStyle::default(),
            value: CellStyle::attr(Attr::L_GREEN),
        }
    }
}

impl FrameView {
    /// Render into an existing framebuffer, resizing it to `viewport`.
    pub fn render_into(&self, state: &FrontState, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear();

        if let Some(player) = &state.player {
            self.draw_sidebar(fb, player);
            self.draw_status_line(fb, player, viewport);
        }

        let map_w = match &state.map {
            Some(frame) => {
                self.draw_map(fb, frame);
                frame.width
            }
            None => {
                let waiting = CellStyle::attr(Attr::SLATE);
                fb.put_str(COL_MAP, ROW_MAP, "waiting for the bridge...", waiting);
                0
            }
        };

        let panel_x = COL_MAP.saturating_add(map_w).saturating_add(1);
        if viewport.width.saturating_sub(panel_x) >= INVENTORY_MIN_W {
            self.draw_inventory(fb, &state.inventory, panel_x, viewport);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, state: &FrontState, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(state, viewport, &mut fb);
        fb
    }

    fn draw_sidebar(&self, fb: &mut FrameBuffer, p: &PlayerInfo) {
        let mut y = ROW_MAP;
        for key in ["name", "race", "house"] {
            if let Some(text) = p.text(key) {
                fb.put_str_max(0, y, text, SIDEBAR_W, self.value);
            }
            y += 1;
        }
        y += 1;

        for stat in Stat::ALL {
            if let Some((value, drain, temp)) = p.triple(stat.as_str()) {
                let label = capitalize(stat.as_str());
                fb.put_str(0, y, &label, self.label);
                let style = if drain < 0 {
                    CellStyle::attr(Attr::YELLOW)
                } else {
                    self.value
                };
                let total = value.saturating_add(drain).saturating_add(temp);
                fb.put_int_right(SIDEBAR_W - 1, y, total, style);
            }
            y += 1;
        }
        y += 1;

        for (label, key) in [("Health", "hp"), ("Voice", "voice")] {
            if let Some((cur, max)) = p.pair(key) {
                fb.put_str(0, y, label, self.label);
                let style = meter_style(cur, max);
                let text = format!("{cur}:{max}");
                fb.put_str(SIDEBAR_W.saturating_sub(text.len() as u16), y, &text, style);
            }
            y += 1;
        }
        y += 1;

        if let Some((skill, dice, sides)) = p.triple("melee") {
            fb.put_str(0, y, &format!("({skill:+},{dice}d{sides})"), self.label);
            y += 1;
        }
        if let Some((skill, dice, sides)) = p.triple("archery") {
            fb.put_str(0, y, &format!("({skill:+},{dice}d{sides})"), self.label);
            y += 1;
        }
        if let Some(ev) = p.int("evasion") {
            fb.put_str(0, y, &format!("[{ev:+}]"), self.label);
            y += 1;
        }
        y += 1;

        if let Some((exp, _)) = p.pair("exp") {
            fb.put_str(0, y, "Exp", self.label);
            fb.put_int_right(SIDEBAR_W - 1, y, exp, self.value);
            y += 1;
        }
        if let Some((weight, limit)) = p.pair("burden") {
            fb.put_str(0, y, "Burden", self.label);
            let style = if weight > limit {
                CellStyle::attr(Attr::ORANGE)
            } else {
                self.value
            };
            // Burden is kept in tenths of a pound.
            fb.put_int_right(SIDEBAR_W - 1, y, weight / 10, style);
        }
    }

    fn draw_status_line(&self, fb: &mut FrameBuffer, p: &PlayerInfo, viewport: Viewport) {
        let y = viewport.height.saturating_sub(1);
        let mut x = 0;

        if let Some(depth) = p.int("depth") {
            let text = format!("{}ft", depth.saturating_mul(50));
            x = fb.put_str(x, y, &text, self.value) + 1;
        }
        if let Some((cur, _)) = p.pair("hp") {
            if cur <= 0 {
                x = fb.put_str(x, y, "Dying", CellStyle::attr(Attr::RED).bold()) + 1;
            }
        }
        if p.int("poison").unwrap_or(0) > 0 {
            x = fb.put_str(x, y, "Poisoned", CellStyle::attr(Attr::GREEN)) + 1;
        }
        if p.flag("stealth") {
            x = fb.put_str(x, y, "Stealth", CellStyle::attr(Attr::L_BLUE)) + 1;
        }
        let songs = p.songs();
        if !songs.is_empty() {
            let text = format!("Song: {}", songs.join("/"));
            x = fb.put_str(x, y, &text, CellStyle::attr(Attr::VIOLET)) + 1;
        }
        if let Some(turn) = p.int("gameturn") {
            fb.put_str(x, y, &format!("Turn {turn}"), self.label.dim());
        }
    }

    /// Cells are placed in arrival order. When the bridge dropped grids
    /// outside the world, later cells shift left; the message carries no
    /// positions to recover from that.
    fn draw_map(&self, fb: &mut FrameBuffer, frame: &MapFrame) {
        if frame.width == 0 {
            return;
        }
        let w = frame.width as usize;
        for (i, cell) in frame.cells.iter().enumerate() {
            let x = (i % w) as u16;
            let y = (i / w) as u16;
            if y >= frame.height {
                break;
            }
            fb.put_char(COL_MAP + x, ROW_MAP + y, cell.ch, CellStyle::attr(cell.attr));
        }
    }

    fn draw_inventory(&self, fb: &mut FrameBuffer, items: &[String], x: u16, viewport: Viewport) {
        let width = viewport.width.saturating_sub(x);
        let mut y = ROW_MAP;
        fb.put_str(x, y, "Inventory", self.label.bold());
        y += 1;

        if items.is_empty() {
            fb.put_str(x, y, "(empty)", self.label.dim());
            return;
        }
        for (i, item) in items.iter().enumerate() {
            if y >= viewport.height.saturating_sub(1) {
                break;
            }
            let letter = (b'a' + (i % 26) as u8) as char;
            let end = fb.put_str(x, y, &format!("{letter}) "), self.label);
            fb.put_str_max(end, y, item, width.saturating_sub(3), CellStyle::default());
            y += 1;
        }
    }
}

fn meter_style(cur: i64, max: i64) -> CellStyle {
    let color = if cur >= max {
        Attr::L_GREEN
    } else if cur.saturating_mul(10) > max.saturating_mul(5) {
        Attr::YELLOW
    } else {
        Attr::RED
    };
    CellStyle::attr(color)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fb::Rgb;
    use sil_bridge_adapter::parse_message;

    fn state_from(lines: &[&str]) -> FrontState {
        let mut state = FrontState::default();
        for line in lines {
            state.apply(parse_message(line).unwrap());
        }
        state
    }

    #[test]
    fn map_glyphs_land_at_the_map_offset() {
        let state = state_from(&[r##"(map 3 2 (("#" 2) ("." 1) ("@" 1) ("." 1) ("." 1) ("." 1)))"##]);
        let fb = FrameView::default().render(&state, Viewport::new(80, 24));

        let wall = fb.get(COL_MAP, ROW_MAP).unwrap();
        assert_eq!(wall.ch, '#');
        assert_eq!(wall.style.fg, Rgb::from_attr(Attr::SLATE));
        assert_eq!(fb.get(COL_MAP + 2, ROW_MAP).unwrap().ch, '@');
        assert_eq!(fb.get(COL_MAP, ROW_MAP + 1).unwrap().ch, '.');
    }

    #[test]
    fn sidebar_shows_identity_and_vitals() {
        let state = state_from(&[
            r#"(player-info :hp (28 30) :voice (12 15) :exp (150 1200) :burden (212 480) :str (2 0 0) :dex (3 0 0) :con (1 -1 0) :gra (4 0 1) :melee (5 1 5) :archery (4 1 7) :evasion 3 :song ("Silence") :poison 0 :stealth t :name "Arakano" :race "Noldor" :house "Feanor" :depth 1 :age 2500 :height 78 :weight 180 :gameturn 7)"#,
        ]);
        let fb = FrameView::default().render(&state, Viewport::new(80, 24));

        assert!(fb.row_text(ROW_MAP).starts_with("Arakano"));
        assert!(fb.row_text(ROW_MAP + 2).starts_with("Feanor"));
        assert!(fb.row_text(ROW_MAP + 4).starts_with("Str"));
        let con = fb.row_text(ROW_MAP + 6);
        assert!(con.starts_with("Con"));
        assert_eq!(&con[..SIDEBAR_W as usize], "Con        0");
        let status = fb.row_text(23);
        assert!(status.contains("Stealth"));
        assert!(status.contains("Song: Silence"));
        assert!(status.contains("Turn 7"));
    }

    #[test]
    fn inventory_panel_needs_room() {
        let state = state_from(&[
            r#"(map 4 1 (("." 1) ("." 1) ("." 1) ("." 1)))"#,
            r#"(inventory ("a Dagger (1d5)"))"#,
        ]);
        let wide = FrameView::default().render(&state, Viewport::new(60, 10));
        let panel_x = COL_MAP + 4 + 1;
        assert_eq!(&wide.row_text(ROW_MAP)[panel_x as usize..][..9], "Inventory");
        assert!(wide.row_text(ROW_MAP + 1).contains("a) a Dagger (1d5)"));

        let narrow = FrameView::default().render(&state, Viewport::new(30, 10));
        assert!(!narrow.row_text(ROW_MAP).contains("Inventory"));
    }

    #[test]
    fn extreme_wire_numbers_do_not_overflow() {
        let state = state_from(&[
            r#"(player-info :hp (9223372036854775807 -9223372036854775808) :str (9223372036854775807 1 1) :depth 9223372036854775807)"#,
        ]);
        let fb = FrameView::default().render(&state, Viewport::new(80, 24));

        let str_row = fb.row_text(ROW_MAP + 4);
        assert!(str_row.contains("9223372036854775807"), "{str_row}");
        assert!(fb.row_text(23).starts_with("9223372036854775807ft"));
    }

    #[test]
    fn unknown_tags_are_remembered() {
        let state = state_from(&["(cursor 1 2)"]);
        assert_eq!(state.last_unknown.as_deref(), Some("cursor"));
        assert_eq!(state.received, 1);
        assert!(state.player.is_none());
    }
}
