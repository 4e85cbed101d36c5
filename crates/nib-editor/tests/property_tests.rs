//! Property tests: no key sequence can push the cursor out of the buffer.

use nib_editor::store::MemoryStore;
use nib_editor::{Editor, Key, LineBuffer, Mode};
use proptest::prelude::*;

fn line_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just('a'), Just('é'), Just('中'), Just(' ')], 0..12)
        .prop_map(|chars| chars.into_iter().collect())
}

fn buffer_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(line_strategy(), 1..20)
}

fn motion_strategy() -> impl Strategy<Value = Key> {
    prop_oneof![
        Just(Key::Char('h')),
        Just(Key::Char('j')),
        Just(Key::Char('k')),
        Just(Key::Char('l')),
        Just(Key::Left),
        Just(Key::Right),
        Just(Key::Up),
        Just(Key::Down),
    ]
}

/// Any key except `:`, so a session never quits or writes.
fn editing_key_strategy() -> impl Strategy<Value = Key> {
    prop_oneof![
        motion_strategy(),
        Just(Key::Char('i')),
        Just(Key::Char('o')),
        Just(Key::Char('x')),
        Just(Key::Char('中')),
        Just(Key::Escape),
        Just(Key::Enter),
        Just(Key::Backspace),
        Just(Key::Space),
        Just(Key::Tab),
    ]
}

fn assert_cursor_in_bounds(ed: &Editor<MemoryStore>, rows: u16) -> Result<(), TestCaseError> {
    let buf = ed.buffer();
    let cursor = ed.cursor();
    prop_assert!(buf.line_count() >= 1);
    prop_assert!(cursor.line() < buf.line_count());

    let line = buf.line(cursor.line()).unwrap();
    prop_assert!(cursor.column() <= line.len());
    prop_assert!(line.is_char_boundary(cursor.column()));

    let height = usize::from(rows.saturating_sub(1)).max(1);
    prop_assert!(cursor.scroll() <= cursor.line());
    prop_assert!(cursor.line() < cursor.scroll() + height);
    Ok(())
}

proptest! {
    #[test]
    fn prop_normal_motions_stay_in_bounds(
        lines in buffer_strategy(),
        keys in prop::collection::vec(motion_strategy(), 0..200),
        rows in 1u16..30,
    ) {
        let mut ed = Editor::new(LineBuffer::from_lines(lines), MemoryStore::new());
        ed.resize(rows);
        for key in keys {
            ed.handle_key(key);
            prop_assert_eq!(ed.mode(), &Mode::Normal);
            assert_cursor_in_bounds(&ed, rows)?;
        }
    }

    #[test]
    fn prop_editing_keeps_invariants(
        lines in buffer_strategy(),
        keys in prop::collection::vec(editing_key_strategy(), 0..200),
        rows in 1u16..30,
    ) {
        let mut ed = Editor::new(LineBuffer::from_lines(lines), MemoryStore::new());
        ed.resize(rows);
        for key in keys {
            ed.handle_key(key);
            assert_cursor_in_bounds(&ed, rows)?;
        }
        prop_assert!(ed.store().is_empty());
    }

    #[test]
    fn prop_load_save_round_trip(lines in buffer_strategy()) {
        let text = lines.join("\n");
        let buf = LineBuffer::from_text(&text);
        // A lone empty last line is swallowed as a trailing newline.
        if lines.len() > 1 && lines.last().is_some_and(String::is_empty) {
            prop_assert_eq!(buf.line_count(), lines.len() - 1);
        } else {
            prop_assert_eq!(buf.contents(), text);
        }
    }
}
