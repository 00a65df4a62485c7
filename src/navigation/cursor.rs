use crate::error::{Result, TrainerError};
use crate::state::AppState;

impl AppState {
    /// Select a repertoire and put the cursor on its root.
    pub fn select_repertoire(&mut self, id: &str) -> Result<()> {
        let root = self
            .repertoire(id)
            .ok_or_else(|| TrainerError::repertoire_not_found(id))?
            .root_node_id
            .clone();

        self.selected_repertoire_id = Some(id.to_string());
        self.current_position_node_id = Some(root);
        Ok(())
    }

    /// Jump to any position of the selected repertoire.
    pub fn navigate_to_position(&mut self, node_id: &str) -> Result<()> {
        let inside = self
            .selected_repertoire()
            .map_or(false, |r| r.contains(node_id));
        if !inside {
            return Err(TrainerError::InvalidPosition(node_id.to_string()));
        }

        self.current_position_node_id = Some(node_id.to_string());
        Ok(())
    }

    /// Step back along the first incoming move. Returns false at the root.
    pub fn go_to_parent(&mut self) -> bool {
        let parent = self
            .current_node()
            .and_then(|n| n.first_parent())
            .map(|p| p.from_node_id.clone());

        match parent {
            Some(id) => {
                self.current_position_node_id = Some(id);
                true
            }
            None => false,
        }
    }

    /// Step forward along a move already recorded from the current position.
    pub fn play_move(&mut self, uci: &str) -> Result<String> {
        let target = self
            .current_node()
            .and_then(|n| n.find_move(uci))
            .map(|m| m.target_node_id.clone())
            .ok_or_else(|| TrainerError::InvalidPosition(uci.to_string()))?;

        self.current_position_node_id = Some(target.clone());
        Ok(target)
    }

    pub fn go_to_root(&mut self) {
        let root = self.selected_repertoire().map(|r| r.root_node_id.clone());
        if root.is_some() {
            self.current_position_node_id = root;
        }
    }

    pub fn clear_cursor(&mut self) {
        self.selected_repertoire_id = None;
        self.current_position_node_id = None;
    }
}
