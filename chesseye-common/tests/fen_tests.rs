//! Position analyzer behavior tests
//!
//! Structural checks, piece counting, empty-board detection and king
//! validation on realistic detector output.

use chesseye_common::fen::{
    count_pieces, extract_position_field, is_empty_board, is_structurally_valid,
    is_valid_playable_position, position_validation_error, starting_position_fen, validate_fen,
    PositionError,
};

const WHITE_KING_REMOVED: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1BNR w KQkq - 0 1";

#[test]
fn test_structural_validity_requires_exactly_eight_groups() {
    assert!(is_structurally_valid(starting_position_fen()));
    assert!(is_structurally_valid("8/8/8/8/8/8/8/8"));
    assert!(is_structurally_valid("a/b/c/d/e/f/g/h w - - 0 1"));

    for groups in [1usize, 7, 9, 12] {
        let position = vec!["8"; groups].join("/");
        assert!(
            !is_structurally_valid(&format!("{position} w - - 0 1")),
            "{groups} groups should be invalid"
        );
    }

    assert!(!is_structurally_valid(""));
    assert!(!is_structurally_valid("   "));
}

#[test]
fn test_count_pieces() {
    assert_eq!(count_pieces("8/8/8/8/8/8/8/8 w KQkq - 0 1"), 0);
    assert_eq!(count_pieces(starting_position_fen()), 32);
    assert_eq!(count_pieces("4k3/8/8/8/8/8/8/4K3 w - - 0 1"), 2);
    assert_eq!(count_pieces(""), 0);
    assert_eq!(count_pieces("  \t"), 0);
    // Only the position field is counted, never castling letters
    assert_eq!(count_pieces("8/8/8/8/8/8/8/8 b KQkq - 0 1"), 0);
}

#[test]
fn test_empty_board() {
    assert!(is_empty_board(""));
    assert!(is_empty_board("   "));
    assert!(is_empty_board("8/8/8/8/8/8/8/8"));
    assert!(is_empty_board("8/8/8/8/8/8/8/8 w - - 0 1"));
    assert!(!is_empty_board(starting_position_fen()));
    assert!(!is_empty_board("4k3/8/8/8/8/8/8/4K3 w - - 0 1"));
}

#[test]
fn test_position_field_is_whole_string_without_whitespace() {
    assert_eq!(extract_position_field("4k3/8/8/8/8/8/8/4K3"), "4k3/8/8/8/8/8/8/4K3");
}

#[test]
fn test_starting_position_is_valid() {
    assert_eq!(position_validation_error(Some(starting_position_fen())), None);
    assert!(is_valid_playable_position(starting_position_fen()));
    assert!(validate_fen(starting_position_fen()));
}

#[test]
fn test_missing_kings() {
    let error = position_validation_error(Some(WHITE_KING_REMOVED));
    assert_eq!(error, Some(PositionError::WhiteKingMissing));
    assert_eq!(error.unwrap().to_string(), "White king missing");

    assert_eq!(
        position_validation_error(Some(
            "rnbq1bnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        ))
        .map(|e| e.to_string()),
        Some("Black king missing".to_string())
    );

    assert_eq!(
        position_validation_error(Some("8/8/8/8/8/8/8/8 w - - 0 1")),
        Some(PositionError::BothKingsMissing)
    );
    assert!(!is_valid_playable_position(WHITE_KING_REMOVED));
}

#[test]
fn test_extra_kings() {
    assert_eq!(
        position_validation_error(Some("4k3/8/8/8/8/8/8/K3K3 w - - 0 1"))
            .map(|e| e.to_string()),
        Some("Too many white kings".to_string())
    );
    assert_eq!(
        position_validation_error(Some("k3k3/8/8/8/8/8/8/4K3 w - - 0 1"))
            .map(|e| e.to_string()),
        Some("Too many black kings".to_string())
    );
    assert!(!is_valid_playable_position("k3k3/8/8/8/8/8/8/K3K3 w - - 0 1"));
}

#[test]
fn test_no_position() {
    assert_eq!(
        position_validation_error(None).map(|e| e.to_string()),
        Some("No position available".to_string())
    );
    assert_eq!(position_validation_error(Some("")), Some(PositionError::NoPosition));
    assert_eq!(position_validation_error(Some("  ")), Some(PositionError::NoPosition));
}

#[test]
fn test_unparsable_positions_report_structure() {
    for fen in [
        "not a fen",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1",
    ] {
        assert_eq!(
            position_validation_error(Some(fen)),
            Some(PositionError::InvalidStructure),
            "'{fen}' should be an invalid structure"
        );
        assert!(!is_valid_playable_position(fen));
        assert!(!validate_fen(fen));
    }
}
