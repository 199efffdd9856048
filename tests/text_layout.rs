use cog_tui::{
    grapheme_count, pad_to_width, parse_input_events, truncate_graphemes, visible_width,
    wrap_text, DiffRenderer, Frame, InputEvent, Key,
};

#[test]
fn titles_are_cut_by_user_visible_characters() {
    let flags = "🇯🇵".repeat(40);
    let cut = truncate_graphemes(&flags, 30, "...");

    assert_eq!(grapheme_count(&cut), 30);
    assert!(cut.ends_with("..."));
    assert!(cut.starts_with("🇯🇵"));
}

#[test]
fn wrapped_chat_lines_never_exceed_the_pane() {
    let text = "A reply that mixes 日本語 text, emoji 👍🏽 and a verylongunbreakablewordthatmustsplit.";
    for width in [8, 13, 21] {
        for line in wrap_text(text, width) {
            assert!(visible_width(&line) <= width, "{line:?} wider than {width}");
        }
    }
}

#[test]
fn padded_sidebar_cells_have_exact_width() {
    assert_eq!(visible_width(&pad_to_width("\x1b[1mNew Chat\x1b[22m", 12)), 12);
    assert_eq!(visible_width(&pad_to_width("日本語のタイトルです", 7)), 7);
}

#[test]
fn keystrokes_and_paste_arrive_in_order() {
    let events = parse_input_events("hi\x1b[A\x1b[200~a\nb\x1b[201~\x0e");
    assert_eq!(
        events,
        vec![
            InputEvent::Text("hi".to_string()),
            InputEvent::Key(Key::Up),
            InputEvent::Paste("a\nb".to_string()),
            InputEvent::Key(Key::Ctrl('n')),
        ]
    );
}

#[test]
fn renderer_only_rewrites_changed_rows() {
    let mut renderer = DiffRenderer::new();
    renderer.render(&Frame::new(vec!["Cog".into(), "┃ ".into()]), 20, 2);
    let update = renderer.render(&Frame::new(vec!["Cog".into(), "┃ hi".into()]), 20, 2);

    assert!(!update.contains("Cog"));
    assert!(update.contains("\x1b[2;1H┃ hi"));
}
