use shakmaty::{
    fen::Fen, san::San, uci::UciMove, CastlingMode, Chess, Color, EnPassantMode, Move, Position,
};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Standard starting position, including move counters.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Invalid move: {0}")]
    InvalidMove(String),
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    White,
    Black,
}

impl PlayerColor {
    pub fn opposite(self) -> Self {
        match self {
            PlayerColor::White => PlayerColor::Black,
            PlayerColor::Black => PlayerColor::White,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlayerColor::White => "white",
            PlayerColor::Black => "black",
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PlayerColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(PlayerColor::White),
            "black" | "b" => Ok(PlayerColor::Black),
            other => Err(format!("expected white or black, got \"{}\"", other)),
        }
    }
}

impl From<Color> for PlayerColor {
    fn from(c: Color) -> Self {
        match c {
            Color::White => PlayerColor::White,
            Color::Black => PlayerColor::Black,
        }
    }
}

impl From<PlayerColor> for Color {
    fn from(c: PlayerColor) -> Self {
        match c {
            PlayerColor::White => Color::White,
            PlayerColor::Black => Color::Black,
        }
    }
}

/// A move as reported by the rules engine: notation plus the position it leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub san: String,
    pub uci: String,
    pub resulting_fen: String,
}

impl MoveRecord {
    pub fn new(san: impl Into<String>, uci: impl Into<String>, resulting_fen: impl Into<String>) -> Self {
        Self {
            san: san.into(),
            uci: uci.into(),
            resulting_fen: resulting_fen.into(),
        }
    }
}

/// Legal-move oracle for a single position.
///
/// The repertoire core never checks legality itself; callers resolve typed
/// notation through this type and hand the resulting [`MoveRecord`] to the store.
pub struct Board {
    position: Chess,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            position: Chess::default(),
        }
    }
}

impl Board {
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let parsed: Fen = fen
            .parse()
            .map_err(|e| RulesError::InvalidFen(format!("{:?}", e)))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidFen(format!("{:?}", e)))?;
        Ok(Self { position })
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }

    pub fn turn(&self) -> PlayerColor {
        self.position.turn().into()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves().into_iter().collect()
    }

    /// Resolves either UCI (`e2e4`) or SAN (`e4`, `Nf3`, `O-O`) notation.
    pub fn play(&self, notation: &str) -> Result<MoveRecord, RulesError> {
        let notation = notation.trim();
        match self.play_uci(notation) {
            Ok(record) => Ok(record),
            Err(_) => self.play_san(notation),
        }
    }

    pub fn play_san(&self, san_str: &str) -> Result<MoveRecord, RulesError> {
        let san: San = san_str
            .parse()
            .map_err(|_| RulesError::InvalidMove(san_str.to_string()))?;

        let m = san
            .to_move(&self.position)
            .map_err(|_| RulesError::InvalidMove(san_str.to_string()))?;

        self.apply_move(m)
    }

    pub fn play_uci(&self, uci_str: &str) -> Result<MoveRecord, RulesError> {
        let uci: UciMove = uci_str
            .parse()
            .map_err(|_| RulesError::InvalidMove(uci_str.to_string()))?;

        let m = uci
            .to_move(&self.position)
            .map_err(|_| RulesError::InvalidMove(uci_str.to_string()))?;

        self.apply_move(m)
    }

    fn apply_move(&self, m: Move) -> Result<MoveRecord, RulesError> {
        let san = San::from_move(&self.position, m.clone());
        let uci = UciMove::from_move(m.clone(), CastlingMode::Standard);

        let next = self
            .position
            .clone()
            .play(m)
            .map_err(|e| RulesError::InvalidMove(format!("{:?}", e)))?;

        Ok(MoveRecord {
            san: san.to_string(),
            uci: uci.to_string(),
            resulting_fen: Fen::from_position(&next, EnPassantMode::Legal).to_string(),
        })
    }
}
