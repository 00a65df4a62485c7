use crate::error::{Result, TrainerError};
use crate::game::{MoveRecord, PlayerColor};
use crate::preferences::{Preferences, Theme};
use crate::repertoire::{InvariantViolation, PositionNode, Repertoire};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Everything the trainer persists: repertoires, the navigation cursor and
/// board preferences.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub selected_repertoire_id: Option<String>,
    pub current_position_node_id: Option<String>,
    /// Display order is insertion order.
    pub repertoires: Vec<Repertoire>,
    pub preferences: Preferences,
}

impl AppState {
    pub fn repertoire(&self, id: &str) -> Option<&Repertoire> {
        self.repertoires.iter().find(|r| r.id == id)
    }

    fn repertoire_mut(&mut self, id: &str) -> Result<&mut Repertoire> {
        self.repertoires
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| TrainerError::repertoire_not_found(id))
    }

    pub fn selected_repertoire(&self) -> Option<&Repertoire> {
        self.selected_repertoire_id
            .as_deref()
            .and_then(|id| self.repertoire(id))
    }

    pub fn current_node(&self) -> Option<&PositionNode> {
        let node_id = self.current_position_node_id.as_deref()?;
        self.selected_repertoire()?.node(node_id)
    }

    pub fn current_theme(&self) -> Theme {
        self.preferences.current_theme()
    }

    /// Append a repertoire rooted at the standard starting position.
    pub fn create_repertoire(&mut self, name: impl Into<String>, perspective: PlayerColor) -> String {
        let repertoire = Repertoire::new(name.into(), perspective);
        let id = repertoire.id.clone();
        tracing::info!("Created repertoire {} ({})", repertoire.name, id);
        self.repertoires.push(repertoire);
        id
    }

    pub fn add_move(
        &mut self,
        repertoire_id: &str,
        from_node_id: &str,
        record: &MoveRecord,
    ) -> Result<String> {
        let target = self
            .repertoire_mut(repertoire_id)?
            .add_move(from_node_id, record)?;
        tracing::debug!("Recorded {} ({}) from {} -> {}", record.san, record.uci, from_node_id, target);
        Ok(target)
    }

    pub fn delete_repertoire(&mut self, id: &str) -> Result<Repertoire> {
        let idx = self
            .repertoires
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| TrainerError::repertoire_not_found(id))?;

        if self.selected_repertoire_id.as_deref() == Some(id) {
            self.clear_cursor();
        }
        let removed = self.repertoires.remove(idx);
        tracing::info!("Deleted repertoire {} ({})", removed.name, removed.id);
        Ok(removed)
    }

    pub fn rename_repertoire(&mut self, id: &str, name: impl Into<String>) -> Result<()> {
        let repertoire = self.repertoire_mut(id)?;
        repertoire.name = name.into();
        repertoire.touch();
        Ok(())
    }

    pub fn set_main_line(&mut self, repertoire_id: &str, node_id: &str, uci: &str) -> Result<()> {
        self.repertoire_mut(repertoire_id)?.set_main_line(node_id, uci)
    }

    /// Check every repertoire plus the cross-repertoire invariants.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut ids = HashSet::new();
        for repertoire in &self.repertoires {
            if !ids.insert(repertoire.id.as_str()) {
                return Err(InvariantViolation::DuplicateRepertoireId(repertoire.id.clone()));
            }
            repertoire.validate()?;
        }

        self.validate_cursor()
    }

    /// The selection names an existing repertoire, the position lies inside
    /// it, and neither is set without the other.
    pub fn validate_cursor(&self) -> Result<(), InvariantViolation> {
        match (&self.selected_repertoire_id, &self.current_position_node_id) {
            (None, None) => Ok(()),
            (Some(id), _) if self.repertoire(id).is_none() => {
                Err(InvariantViolation::DanglingSelection(id.clone()))
            }
            (Some(id), None) => Err(InvariantViolation::IncompleteCursor(id.clone())),
            (_, Some(node_id)) => {
                let inside = self
                    .selected_repertoire()
                    .map_or(false, |r| r.contains(node_id));
                if inside {
                    Ok(())
                } else {
                    Err(InvariantViolation::CursorOutOfBounds(node_id.clone()))
                }
            }
        }
    }

    /// Clear a cursor that does not point into the repertoires. Returns
    /// whether anything was cleared.
    pub fn repair_cursor(&mut self) -> bool {
        match self.validate_cursor() {
            Ok(()) => false,
            Err(e) => {
                tracing::warn!("Clearing cursor: {}", e);
                self.clear_cursor();
                true
            }
        }
    }
}
