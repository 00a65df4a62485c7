use crate::game::PlayerColor;
use crate::repertoire::{IncomingMove, Repertoire};
use crate::state::AppState;

/// One continuation from a position, numbered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveListEntry {
    pub number: usize,
    pub side: PlayerColor,
    /// True when `side` is the repertoire's own color, i.e. a prepared move
    /// rather than an expected reply.
    pub prepared: bool,
    pub san: String,
    pub uci: String,
    pub target_node_id: String,
    pub is_main_line: bool,
}

impl MoveListEntry {
    pub fn label(&self) -> String {
        match self.side {
            PlayerColor::White => format!("{}. {}", self.number, self.san),
            PlayerColor::Black => format!("{}... {}", self.number, self.san),
        }
    }
}

/// Continuations from `node_id`, main line first and then in insertion order.
pub fn move_list(repertoire: &Repertoire, node_id: &str) -> Vec<MoveListEntry> {
    let Some(node) = repertoire.node(node_id) else {
        return Vec::new();
    };

    let depth = repertoire.depth_of(node_id);
    let number = 1 + depth / 2;
    let side = if depth % 2 == 0 {
        PlayerColor::White
    } else {
        PlayerColor::Black
    };

    let mut entries: Vec<MoveListEntry> = node
        .moves
        .iter()
        .map(|m| MoveListEntry {
            number,
            side,
            prepared: side == repertoire.perspective,
            san: m.san.clone(),
            uci: m.uci.clone(),
            target_node_id: m.target_node_id.clone(),
            is_main_line: m.is_main_line,
        })
        .collect();
    // Stable, so siblings keep insertion order.
    entries.sort_by_key(|e| !e.is_main_line);
    entries
}

/// Render a root-first sequence of moves as numbered text, e.g. `1. e4 e5 2. Nf3`.
pub fn format_line(moves: &[&IncomingMove]) -> String {
    let mut text = String::new();

    for (i, m) in moves.iter().enumerate() {
        if i % 2 == 0 {
            text.push_str(&format!("{}. ", i / 2 + 1));
        }
        text.push_str(&m.san);
        text.push(' ');
    }

    text.trim_end().to_string()
}

impl AppState {
    /// Continuations from the cursor position.
    pub fn current_moves(&self) -> Vec<MoveListEntry> {
        match (self.selected_repertoire(), &self.current_position_node_id) {
            (Some(repertoire), Some(node_id)) => move_list(repertoire, node_id),
            _ => Vec::new(),
        }
    }

    /// The moves leading from the root to the cursor position.
    pub fn current_line(&self) -> String {
        match (self.selected_repertoire(), &self.current_position_node_id) {
            (Some(repertoire), Some(node_id)) => format_line(&repertoire.line_to(node_id)),
            _ => String::new(),
        }
    }
}
