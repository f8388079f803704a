use pretty_assertions::assert_eq;

use super::*;

#[test]
fn first_character_is_line_one_column_one() {
    let index = LineIndex::new("struct A {}");
    assert_eq!(index.position(0), SourcePos::new(1, 1));
    assert_eq!(index.position(7), SourcePos::new(1, 8));
}

#[test]
fn positions_after_newlines() {
    let index = LineIndex::new("a\nbc\n\nd");
    assert_eq!(index.line_count(), 4);
    assert_eq!(index.position(2), SourcePos::new(2, 1));
    assert_eq!(index.position(3), SourcePos::new(2, 2));
    assert_eq!(index.position(5), SourcePos::new(3, 1));
    assert_eq!(index.position(6), SourcePos::new(4, 1));
}

#[test]
fn columns_count_characters_not_bytes() {
    let index = LineIndex::new("// é\nx");
    assert_eq!(index.position(5), SourcePos::new(1, 5));
    assert_eq!(index.position(7), SourcePos::new(2, 2));
}

#[test]
fn offsets_past_the_end_clamp() {
    let index = LineIndex::new("ab");
    assert_eq!(index.position(100), SourcePos::new(1, 3));
}
