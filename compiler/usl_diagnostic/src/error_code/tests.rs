use super::*;

#[test]
fn display_matches_variant_name() {
    assert_eq!(ErrorCode::E0001.to_string(), "E0001");
    assert_eq!(format!("{:?}", ErrorCode::E3003), ErrorCode::E3003.as_str());
}

#[test]
fn phase_follows_first_digit() {
    assert_eq!(ErrorCode::E0002.phase(), "lexer");
    assert_eq!(ErrorCode::E1004.phase(), "parser");
    assert_eq!(ErrorCode::E2001.phase(), "specialization");
    assert_eq!(ErrorCode::E3001.phase(), "extraction");
    assert_eq!(ErrorCode::E4001.phase(), "codegen");
}
