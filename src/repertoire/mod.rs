mod validate;

pub use validate::InvariantViolation;

use crate::error::{Result, TrainerError};
use crate::game::{MoveRecord, PlayerColor, STARTING_FEN};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An edge leaving a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMove {
    pub san: String,
    pub uci: String,
    pub target_node_id: String,
    /// Preferred continuation for display. At most one per node.
    pub is_main_line: bool,
}

/// Back-reference mirroring an [`OutgoingMove`] on `from_node_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMove {
    pub from_node_id: String,
    pub san: String,
    pub uci: String,
}

/// A position in a repertoire. Several `parent_moves` mean the position is
/// reached by transposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionNode {
    pub id: String,
    pub fen: String,
    pub moves: Vec<OutgoingMove>,
    pub parent_moves: Vec<IncomingMove>,
}

impl PositionNode {
    pub fn new(id: String, fen: String) -> Self {
        Self {
            id,
            fen,
            moves: Vec::new(),
            parent_moves: Vec::new(),
        }
    }

    pub fn find_move(&self, uci: &str) -> Option<&OutgoingMove> {
        self.moves.iter().find(|m| m.uci == uci)
    }

    pub fn main_line(&self) -> Option<&OutgoingMove> {
        self.moves.iter().find(|m| m.is_main_line)
    }

    pub fn first_parent(&self) -> Option<&IncomingMove> {
        self.parent_moves.first()
    }
}

/// A named opening repertoire: a graph of positions stored in a flat map keyed by node id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repertoire {
    pub id: String,
    pub name: String,
    pub perspective: PlayerColor,
    pub root_node_id: String,
    pub nodes: BTreeMap<String, PositionNode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Repertoire {
    pub fn new(name: String, perspective: PlayerColor) -> Self {
        let now = Utc::now();
        let root = PositionNode::new("n0".to_string(), STARTING_FEN.to_string());
        let root_node_id = root.id.clone();
        let mut nodes = BTreeMap::new();
        nodes.insert(root_node_id.clone(), root);

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            perspective,
            root_node_id,
            nodes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn root(&self) -> Option<&PositionNode> {
        self.nodes.get(&self.root_node_id)
    }

    pub fn node(&self, id: &str) -> Option<&PositionNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.moves.len()).sum()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Record `record` as a move out of `from_node_id` and return the target node id.
    ///
    /// A node whose FEN equals `record.resulting_fen` exactly is reused, so
    /// transpositions collapse into one position with several parents. The full
    /// FEN includes the move counters, which only grow along an edge, so the
    /// merge never closes a cycle.
    pub fn add_move(&mut self, from_node_id: &str, record: &MoveRecord) -> Result<String> {
        let from = self
            .nodes
            .get(from_node_id)
            .ok_or_else(|| TrainerError::position_not_found(from_node_id))?;

        if from.find_move(&record.uci).is_some() {
            return Err(TrainerError::DuplicateMove {
                node_id: from_node_id.to_string(),
                uci: record.uci.clone(),
            });
        }
        let is_main_line = from.main_line().is_none();

        let target_id = match self.find_transposition(from_node_id, &record.resulting_fen) {
            Some(id) => {
                tracing::debug!("{} transposes into existing position {}", record.san, id);
                id
            }
            None => {
                let id = self.next_node_id();
                self.nodes.insert(
                    id.clone(),
                    PositionNode::new(id.clone(), record.resulting_fen.clone()),
                );
                id
            }
        };

        if let Some(from) = self.nodes.get_mut(from_node_id) {
            from.moves.push(OutgoingMove {
                san: record.san.clone(),
                uci: record.uci.clone(),
                target_node_id: target_id.clone(),
                is_main_line,
            });
        }
        if let Some(target) = self.nodes.get_mut(&target_id) {
            target.parent_moves.push(IncomingMove {
                from_node_id: from_node_id.to_string(),
                san: record.san.clone(),
                uci: record.uci.clone(),
            });
        }

        self.touch();
        Ok(target_id)
    }

    /// Promote the move `uci` from `node_id` to main line, demoting its siblings.
    pub fn set_main_line(&mut self, node_id: &str, uci: &str) -> Result<()> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| TrainerError::position_not_found(node_id))?;

        if node.find_move(uci).is_none() {
            return Err(TrainerError::NotFound {
                what: "Move",
                id: uci.to_string(),
            });
        }
        for m in node.moves.iter_mut() {
            m.is_main_line = m.uci == uci;
        }

        self.touch();
        Ok(())
    }

    /// Moves from the root to `node_id`, following the first parent of each position.
    pub fn line_to(&self, node_id: &str) -> Vec<&IncomingMove> {
        let mut line = Vec::new();
        let mut current = node_id;

        // Bounded by node count so malformed data cannot loop forever.
        for _ in 0..self.nodes.len() {
            if current == self.root_node_id {
                break;
            }
            match self.nodes.get(current).and_then(|n| n.first_parent()) {
                Some(parent) => {
                    line.push(parent);
                    current = parent.from_node_id.as_str();
                }
                None => break,
            }
        }

        line.reverse();
        line
    }

    /// Ply distance from the root along first-parent ancestry.
    pub fn depth_of(&self, node_id: &str) -> usize {
        self.line_to(node_id).len()
    }

    fn find_transposition(&self, from_node_id: &str, fen: &str) -> Option<String> {
        self.nodes
            .values()
            .find(|n| n.fen == fen && n.id != from_node_id && n.id != self.root_node_id)
            .map(|n| n.id.clone())
    }

    fn next_node_id(&self) -> String {
        let mut n = self.nodes.len();
        loop {
            let id = format!("n{}", n);
            if !self.nodes.contains_key(&id) {
                return id;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Board;

    fn record(fen: &str, notation: &str) -> MoveRecord {
        Board::from_fen(fen).unwrap().play(notation).unwrap()
    }

    #[test]
    fn test_new_repertoire_has_single_root() {
        let rep = Repertoire::new("Italian".to_string(), PlayerColor::White);
        assert_eq!(rep.node_count(), 1);
        let root = rep.root().unwrap();
        assert_eq!(root.fen, STARTING_FEN);
        assert!(root.moves.is_empty());
        assert!(root.parent_moves.is_empty());
        assert!(rep.validate().is_ok());
    }

    #[test]
    fn test_add_move_links_both_directions() {
        let mut rep = Repertoire::new("Italian".to_string(), PlayerColor::White);
        let root_id = rep.root_node_id.clone();
        let e4 = MoveRecord::new("e4", "e2e4", "X");

        let new_id = rep.add_move(&root_id, &e4).unwrap();

        assert_eq!(rep.node_count(), 2);
        assert_eq!(
            rep.root().unwrap().moves,
            vec![OutgoingMove {
                san: "e4".to_string(),
                uci: "e2e4".to_string(),
                target_node_id: new_id.clone(),
                is_main_line: true,
            }]
        );
        assert_eq!(
            rep.node(&new_id).unwrap().parent_moves,
            vec![IncomingMove {
                from_node_id: root_id,
                san: "e4".to_string(),
                uci: "e2e4".to_string(),
            }]
        );
        assert_eq!(rep.node(&new_id).unwrap().fen, "X");
    }

    #[test]
    fn test_only_first_move_is_main_line() {
        let mut rep = Repertoire::new("Sicilian".to_string(), PlayerColor::Black);
        let root_id = rep.root_node_id.clone();
        rep.add_move(&root_id, &record(STARTING_FEN, "e4")).unwrap();
        rep.add_move(&root_id, &record(STARTING_FEN, "d4")).unwrap();

        let flags: Vec<bool> = rep.root().unwrap().moves.iter().map(|m| m.is_main_line).collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn test_duplicate_move_leaves_graph_unchanged() {
        let mut rep = Repertoire::new("Italian".to_string(), PlayerColor::White);
        let root_id = rep.root_node_id.clone();
        let e4 = record(STARTING_FEN, "e4");
        rep.add_move(&root_id, &e4).unwrap();
        let before = rep.clone();

        let result = rep.add_move(&root_id, &e4);

        assert!(matches!(result, Err(TrainerError::DuplicateMove { .. })));
        assert_eq!(rep, before);
    }

    #[test]
    fn test_missing_node_is_not_found() {
        let mut rep = Repertoire::new("Italian".to_string(), PlayerColor::White);
        let result = rep.add_move("nope", &MoveRecord::new("e4", "e2e4", "X"));
        assert!(matches!(result, Err(TrainerError::NotFound { what: "Position", .. })));
        assert_eq!(rep.node_count(), 1);
    }

    #[test]
    fn test_transposition_merges_into_one_node() {
        let mut rep = Repertoire::new("QGD".to_string(), PlayerColor::White);
        let root_id = rep.root_node_id.clone();

        // 1. d4 Nf6 2. c4 and 1. c4 Nf6 2. d4 reach the same position.
        let mut a = root_id.clone();
        for san in ["d4", "Nf6", "c4"] {
            let fen = rep.node(&a).unwrap().fen.clone();
            a = rep.add_move(&a, &record(&fen, san)).unwrap();
        }
        let mut b = root_id.clone();
        for san in ["c4", "Nf6", "d4"] {
            let fen = rep.node(&b).unwrap().fen.clone();
            b = rep.add_move(&b, &record(&fen, san)).unwrap();
        }

        assert_eq!(a, b);
        assert_eq!(rep.node(&a).unwrap().parent_moves.len(), 2);
        assert_eq!(rep.node_count(), 6);
        assert_eq!(rep.edge_count(), 6);
        assert!(rep.validate().is_ok());
    }

    #[test]
    fn test_set_main_line_is_exclusive() {
        let mut rep = Repertoire::new("Italian".to_string(), PlayerColor::White);
        let root_id = rep.root_node_id.clone();
        rep.add_move(&root_id, &record(STARTING_FEN, "e4")).unwrap();
        rep.add_move(&root_id, &record(STARTING_FEN, "d4")).unwrap();

        rep.set_main_line(&root_id, "d2d4").unwrap();

        let main: Vec<&str> = rep
            .root()
            .unwrap()
            .moves
            .iter()
            .filter(|m| m.is_main_line)
            .map(|m| m.uci.as_str())
            .collect();
        assert_eq!(main, vec!["d2d4"]);
        assert!(rep.set_main_line(&root_id, "g1f3").is_err());
    }

    #[test]
    fn test_line_to_follows_first_parent() {
        let mut rep = Repertoire::new("Italian".to_string(), PlayerColor::White);
        let mut node = rep.root_node_id.clone();
        for san in ["e4", "e5", "Nf3"] {
            let fen = rep.node(&node).unwrap().fen.clone();
            node = rep.add_move(&node, &record(&fen, san)).unwrap();
        }

        let line: Vec<&str> = rep.line_to(&node).iter().map(|m| m.san.as_str()).collect();
        assert_eq!(line, vec!["e4", "e5", "Nf3"]);
        assert_eq!(rep.depth_of(&node), 3);
        assert_eq!(rep.depth_of(&rep.root_node_id), 0);
    }

    #[test]
    fn test_node_ids_skip_taken_keys() {
        let mut rep = Repertoire::new("Imported".to_string(), PlayerColor::White);
        let mut odd = PositionNode::new("n1".to_string(), "elsewhere".to_string());
        odd.parent_moves.push(IncomingMove {
            from_node_id: "n0".to_string(),
            san: "d4".to_string(),
            uci: "d2d4".to_string(),
        });
        rep.nodes.insert("n1".to_string(), odd);

        let id = rep
            .add_move(&rep.root_node_id.clone(), &MoveRecord::new("e4", "e2e4", "X"))
            .unwrap();
        assert_eq!(id, "n2");
    }
}
