//! FEN position analysis
//!
//! Pure checks over Forsyth–Edwards Notation strings. They exist to catch
//! detection errors in predicted positions (a hallucinated or missing king,
//! an empty board) and are syntactic/cardinality checks only: no move
//! generation, no check detection, no pawn-placement rules.
//!
//! Every function here is total. Malformed input yields a conservative
//! "invalid" answer instead of a panic.

use std::fmt;
use thiserror::Error;

/// Standard chess starting position
pub const STARTING_POSITION_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Position field of a board with no pieces
pub const EMPTY_BOARD_POSITION: &str = "8/8/8/8/8/8/8/8";

const RANK_COUNT: usize = 8;
const FILE_COUNT: usize = 8;
const FEN_FIELD_COUNT: usize = 6;

/// 8x8 board matrix, rank 8 first; empty squares are `""`
pub type BoardMatrix = Vec<Vec<String>>;

/// Piece color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// Piece kind, independent of color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// A colored piece on a square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    /// Parse a FEN piece letter (`PNBRQK` white, `pnbrqk` black)
    pub fn from_fen_char(c: char) -> Option<Self> {
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Self { color, kind })
    }

    /// FEN letter for this piece
    pub fn to_fen_char(self) -> char {
        let c = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

/// Reason a FEN string could not be parsed into a board
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("FEN is empty")]
    Empty,

    #[error("expected 6 fields, found {0}")]
    FieldCount(usize),

    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),

    #[error("rank {rank} does not describe 8 squares")]
    RankWidth { rank: usize },

    #[error("rank {rank} has consecutive empty-square digits")]
    ConsecutiveDigits { rank: usize },

    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),

    #[error("invalid side to move '{0}'")]
    SideToMove(String),

    #[error("invalid castling rights '{0}'")]
    Castling(String),

    #[error("invalid en passant square '{0}'")]
    EnPassant(String),

    #[error("invalid halfmove clock '{0}'")]
    HalfmoveClock(String),

    #[error("invalid fullmove number '{0}'")]
    FullmoveNumber(String),
}

/// Number of kings of each color on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KingCounts {
    pub white: usize,
    pub black: usize,
}

/// A fully parsed FEN position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Squares indexed `[rank_index][file]`, rank 8 at index 0
    squares: [[Option<Piece>; FILE_COUNT]; RANK_COUNT],
    side_to_move: Color,
    castling: String,
    en_passant: Option<String>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Board {
    /// Parse a complete six-field FEN string
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.is_empty() {
            return Err(FenError::Empty);
        }
        if fields.len() != FEN_FIELD_COUNT {
            return Err(FenError::FieldCount(fields.len()));
        }

        let fullmove_number = match fields[5].parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return Err(FenError::FullmoveNumber(fields[5].to_string())),
        };
        let halfmove_clock = fields[4]
            .parse::<u32>()
            .map_err(|_| FenError::HalfmoveClock(fields[4].to_string()))?;

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        if !is_valid_castling(fields[2]) {
            return Err(FenError::Castling(fields[2].to_string()));
        }

        let en_passant = parse_en_passant(fields[3], side_to_move)?;
        let squares = parse_placement(fields[0])?;

        Ok(Self {
            squares,
            side_to_move,
            castling: fields[2].to_string(),
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Piece on a square; `rank` and `file` are 0-based from a1
    pub fn piece_at(&self, file: usize, rank: usize) -> Option<Piece> {
        if file >= FILE_COUNT || rank >= RANK_COUNT {
            return None;
        }
        self.squares[RANK_COUNT - 1 - rank][file]
    }

    /// All pieces on the board, rank 8 to rank 1
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.squares.iter().flatten().filter_map(|square| *square)
    }

    pub fn king_counts(&self) -> KingCounts {
        self.pieces()
            .filter(|piece| piece.kind == PieceKind::King)
            .fold(KingCounts::default(), |mut counts, king| {
                match king.color {
                    Color::White => counts.white += 1,
                    Color::Black => counts.black += 1,
                }
                counts
            })
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling(&self) -> &str {
        &self.castling
    }

    pub fn en_passant(&self) -> Option<&str> {
        self.en_passant.as_deref()
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// 8x8 matrix of FEN piece letters, rank 8 first
    pub fn matrix(&self) -> BoardMatrix {
        self.squares
            .iter()
            .map(|rank| {
                rank.iter()
                    .map(|square| square.map(|p| p.to_fen_char().to_string()).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

fn parse_placement(placement: &str) -> Result<[[Option<Piece>; FILE_COUNT]; RANK_COUNT], FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != RANK_COUNT {
        return Err(FenError::RankCount(ranks.len()));
    }

    let mut squares = [[None; FILE_COUNT]; RANK_COUNT];
    for (rank_index, rank_text) in ranks.iter().enumerate() {
        let rank = RANK_COUNT - rank_index;
        let mut file = 0usize;
        let mut previous_was_digit = false;

        for c in rank_text.chars() {
            if let Some(empty) = c.to_digit(10) {
                if previous_was_digit {
                    return Err(FenError::ConsecutiveDigits { rank });
                }
                if empty == 0 || empty as usize > FILE_COUNT {
                    return Err(FenError::InvalidPiece(c));
                }
                file += empty as usize;
                previous_was_digit = true;
            } else {
                let piece = Piece::from_fen_char(c).ok_or(FenError::InvalidPiece(c))?;
                if file < FILE_COUNT {
                    squares[rank_index][file] = Some(piece);
                }
                file += 1;
                previous_was_digit = false;
            }
            if file > FILE_COUNT {
                return Err(FenError::RankWidth { rank });
            }
        }

        if file != FILE_COUNT {
            return Err(FenError::RankWidth { rank });
        }
    }

    Ok(squares)
}

/// `-` or an ordered, non-empty subset of `KQkq`
fn is_valid_castling(castling: &str) -> bool {
    if castling == "-" {
        return true;
    }
    let order = ['K', 'Q', 'k', 'q'];
    let mut next = 0usize;
    for c in castling.chars() {
        match order[next..].iter().position(|&o| o == c) {
            Some(offset) => next += offset + 1,
            None => return false,
        }
    }
    !castling.is_empty()
}

/// `-` or a rank-3/rank-6 square consistent with the side to move
fn parse_en_passant(field: &str, side_to_move: Color) -> Result<Option<String>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    let mut chars = field.chars();
    let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
        (Some(file), Some(rank), None) => (file, rank),
        _ => return Err(FenError::EnPassant(field.to_string())),
    };
    let consistent = matches!(
        (rank, side_to_move),
        ('6', Color::White) | ('3', Color::Black)
    );
    if !('a'..='h').contains(&file) || !consistent {
        return Err(FenError::EnPassant(field.to_string()));
    }
    Ok(Some(field.to_string()))
}

/// Why a position is not a playable board
///
/// The `Display` text is what the UI shows to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("No position available")]
    NoPosition,

    #[error("Both kings missing")]
    BothKingsMissing,

    #[error("White king missing")]
    WhiteKingMissing,

    #[error("Black king missing")]
    BlackKingMissing,

    /// Both colors have more than one king
    #[error("Too many kings")]
    TooManyKings,

    #[error("Too many white kings")]
    TooManyWhiteKings,

    #[error("Too many black kings")]
    TooManyBlackKings,

    #[error("Invalid position structure")]
    InvalidStructure,
}

/// Standard starting position FEN
pub fn starting_position_fen() -> &'static str {
    STARTING_POSITION_FEN
}

/// Substring before the first whitespace (the piece placement field)
pub fn extract_position_field(fen: &str) -> &str {
    match fen.find(char::is_whitespace) {
        Some(end) => &fen[..end],
        None => fen,
    }
}

/// True iff the position field splits into exactly 8 rank groups
pub fn is_structurally_valid(fen: &str) -> bool {
    !fen.is_empty() && extract_position_field(fen).split('/').count() == RANK_COUNT
}

/// True for blank input or the all-empty placement `8/8/8/8/8/8/8/8`
pub fn is_empty_board(fen: &str) -> bool {
    fen.trim().is_empty() || extract_position_field(fen) == EMPTY_BOARD_POSITION
}

/// Number of piece letters in the position field
///
/// Digits encode runs of empty squares and are not counted.
pub fn count_pieces(fen: &str) -> usize {
    if fen.trim().is_empty() {
        return 0;
    }
    extract_position_field(fen)
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .count()
}

/// Describe what is wrong with a position, or `None` if it is playable
///
/// Playable means the FEN parses and each color has exactly one king.
/// When both colors have extra kings the combined `TooManyKings` is
/// reported; missing kings take precedence over extra kings.
pub fn position_validation_error(fen: Option<&str>) -> Option<PositionError> {
    let fen = match fen {
        Some(fen) if !fen.trim().is_empty() => fen,
        _ => return Some(PositionError::NoPosition),
    };

    let board = match Board::from_fen(fen) {
        Ok(board) => board,
        Err(_) => return Some(PositionError::InvalidStructure),
    };

    match board.king_counts() {
        KingCounts { white: 0, black: 0 } => Some(PositionError::BothKingsMissing),
        KingCounts { white: 0, .. } => Some(PositionError::WhiteKingMissing),
        KingCounts { black: 0, .. } => Some(PositionError::BlackKingMissing),
        KingCounts { white, black } if white > 1 && black > 1 => Some(PositionError::TooManyKings),
        KingCounts { white, .. } if white > 1 => Some(PositionError::TooManyWhiteKings),
        KingCounts { black, .. } if black > 1 => Some(PositionError::TooManyBlackKings),
        _ => None,
    }
}

/// True iff the FEN parses and has exactly one king per color
pub fn is_valid_playable_position(fen: &str) -> bool {
    position_validation_error(Some(fen)).is_none()
}

/// True iff the FEN is syntactically complete and well formed
pub fn validate_fen(fen: &str) -> bool {
    Board::from_fen(fen).is_ok()
}

/// Convert a FEN string to an 8x8 matrix of piece letters
pub fn fen_to_matrix(fen: &str) -> Result<BoardMatrix, FenError> {
    Board::from_fen(fen).map(|board| board.matrix())
}
