use super::Repertoire;
use std::collections::HashSet;
use thiserror::Error;

/// Structural damage found in a repertoire or application state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("root node {0} is missing")]
    MissingRoot(String),
    #[error("node stored under key {key} has id {id}")]
    IdMismatch { key: String, id: String },
    #[error("root node {0} has incoming moves")]
    RootHasParents(String),
    #[error("node {0} has no incoming moves")]
    Orphan(String),
    #[error("move {uci} from {from} targets unknown node {target}")]
    DanglingTarget {
        from: String,
        uci: String,
        target: String,
    },
    #[error("move {uci} from {from} is not mirrored on {target}")]
    MissingIncoming {
        from: String,
        uci: String,
        target: String,
    },
    #[error("incoming move {uci} into {node} has no matching move on {from}")]
    MissingOutgoing {
        node: String,
        from: String,
        uci: String,
    },
    #[error("node {node} records move {uci} more than once")]
    DuplicateUci { node: String, uci: String },
    #[error("node {0} has more than one main line")]
    MultipleMainLines(String),
    #[error("repertoire id {0} appears more than once")]
    DuplicateRepertoireId(String),
    #[error("cursor position {0} is outside the selected repertoire")]
    CursorOutOfBounds(String),
    #[error("selected repertoire {0} does not exist")]
    DanglingSelection(String),
    #[error("repertoire {0} is selected without a cursor position")]
    IncompleteCursor(String),
}

impl Repertoire {
    /// Check the graph invariants: root present, keys match ids, every edge
    /// mirrored in both directions, no repeated uci or double main line per node.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let root = self
            .nodes
            .get(&self.root_node_id)
            .ok_or_else(|| InvariantViolation::MissingRoot(self.root_node_id.clone()))?;
        if !root.parent_moves.is_empty() {
            return Err(InvariantViolation::RootHasParents(root.id.clone()));
        }

        for (key, node) in &self.nodes {
            if *key != node.id {
                return Err(InvariantViolation::IdMismatch {
                    key: key.clone(),
                    id: node.id.clone(),
                });
            }

            let mut seen = HashSet::new();
            let mut main_lines = 0;
            for m in &node.moves {
                if !seen.insert(m.uci.as_str()) {
                    return Err(InvariantViolation::DuplicateUci {
                        node: node.id.clone(),
                        uci: m.uci.clone(),
                    });
                }
                if m.is_main_line {
                    main_lines += 1;
                }

                let target = self.nodes.get(&m.target_node_id).ok_or_else(|| {
                    InvariantViolation::DanglingTarget {
                        from: node.id.clone(),
                        uci: m.uci.clone(),
                        target: m.target_node_id.clone(),
                    }
                })?;
                let mirrored = target
                    .parent_moves
                    .iter()
                    .any(|p| p.from_node_id == node.id && p.uci == m.uci && p.san == m.san);
                if !mirrored {
                    return Err(InvariantViolation::MissingIncoming {
                        from: node.id.clone(),
                        uci: m.uci.clone(),
                        target: target.id.clone(),
                    });
                }
            }
            if main_lines > 1 {
                return Err(InvariantViolation::MultipleMainLines(node.id.clone()));
            }

            if *key == self.root_node_id {
                continue;
            }
            if node.parent_moves.is_empty() {
                return Err(InvariantViolation::Orphan(node.id.clone()));
            }
            for p in &node.parent_moves {
                let matched = self
                    .nodes
                    .get(&p.from_node_id)
                    .and_then(|from| from.find_move(&p.uci))
                    .map_or(false, |m| m.san == p.san && m.target_node_id == node.id);
                if !matched {
                    return Err(InvariantViolation::MissingOutgoing {
                        node: node.id.clone(),
                        from: p.from_node_id.clone(),
                        uci: p.uci.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
