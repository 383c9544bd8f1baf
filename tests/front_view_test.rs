use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use sil_term_bridge::adapter::{parse_message, serializer, StringStyle};
use sil_term_bridge::core::SandboxEngine;
use sil_term_bridge::input::key_to_byte;
use sil_term_bridge::term::{FrameView, FrontState, Viewport};
use sil_term_bridge::types::{Keypress, COL_MAP, MAP_HEIGHT, MAP_WIDTH, ROW_MAP};

fn state_for(engine: &SandboxEngine) -> FrontState {
    let mut state = FrontState::default();
    let lines = [
        serializer::player_line(engine, StringStyle::Escaped).unwrap().unwrap(),
        serializer::map_line(engine, MAP_WIDTH, MAP_HEIGHT, StringStyle::Escaped).unwrap(),
        serializer::inventory_line(engine, StringStyle::Escaped).unwrap(),
    ];
    for line in &lines {
        state.apply(parse_message(line).unwrap());
    }
    state
}

#[test]
fn viewer_draws_the_player_where_the_engine_has_it() {
    let engine = SandboxEngine::tutorial();
    let state = state_for(&engine);
    assert!(state.map.as_ref().unwrap().is_complete());

    let fb = FrameView::default().render(&state, Viewport::new(80, 24));
    let at = engine.position();
    let cell = fb
        .get(COL_MAP + at.x as u16, ROW_MAP + at.y as u16)
        .unwrap();
    assert_eq!(cell.ch, '@');
    assert_eq!(fb.get(COL_MAP + 3, ROW_MAP).unwrap().ch, '#');
}

#[test]
fn viewer_follows_the_player_after_a_move() {
    let mut engine = SandboxEngine::tutorial();
    engine.apply_key(Keypress(b'j'));
    let state = state_for(&engine);
    let fb = FrameView::default().render(&state, Viewport::new(80, 24));

    let at = engine.position();
    assert_eq!(
        fb.get(COL_MAP + at.x as u16, ROW_MAP + at.y as u16).unwrap().ch,
        '@'
    );
    assert_eq!(
        fb.get(COL_MAP + at.x as u16, ROW_MAP + at.y as u16 - 1).unwrap().ch,
        '.'
    );
}

#[test]
fn viewer_shows_inventory_on_a_wide_terminal() {
    let engine = SandboxEngine::tutorial();
    let state = state_for(&engine);
    let fb = FrameView::default().render(&state, Viewport::new(120, 30));

    let rows: Vec<String> = (0..30).map(|y| fb.row_text(y)).collect();
    assert!(rows.iter().any(|r| r.contains("a) a Dagger (1d5)")));
    assert!(rows.iter().any(|r| r.contains("d) 5 Arrows (1d7)")));
}

#[test]
fn key_map_produces_engine_bytes() {
    let cases = [
        (KeyEvent::from(KeyCode::Char('k')), Some(b'k')),
        (KeyEvent::from(KeyCode::Enter), Some(b'\r')),
        (KeyEvent::from(KeyCode::Esc), Some(0x1b)),
        (KeyEvent::from(KeyCode::Left), Some(b'4')),
        (KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL), Some(0x18)),
        (KeyEvent::from(KeyCode::F(5)), None),
    ];
    for (key, want) in cases {
        assert_eq!(key_to_byte(key).map(|k| k.0), want, "{key:?}");
    }
}

#[test]
fn mapped_quit_key_stops_the_sandbox() {
    let mut engine = SandboxEngine::tutorial();
    let ctrl_x = key_to_byte(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)).unwrap();
    assert_eq!(
        engine.apply_key(ctrl_x),
        sil_term_bridge::core::KeyOutcome::Quit
    );
}
