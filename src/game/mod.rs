mod rules;

pub use rules::{Board, MoveRecord, PlayerColor, RulesError, STARTING_FEN};
