use crate::error::{Result, TrainerError};
use crate::game::{MoveRecord, PlayerColor};
use crate::persistence::{self, ImportSource, PersistenceGateway, Storage};
use crate::preferences::{Theme, ThemeKey};
use crate::state::AppState;
use std::path::Path;

/// What the persistence layer is busy with, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistenceActivity {
    #[default]
    Idle,
    Exporting,
    Importing,
    Resetting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Replaced,
    Cancelled,
}

/// Owner of the application state. Every mutation runs on a copy and is only
/// committed, then saved, when it succeeds.
pub struct TrainerApp<S: Storage> {
    state: AppState,
    gateway: PersistenceGateway<S>,
    activity: PersistenceActivity,
}

impl<S: Storage> TrainerApp<S> {
    pub fn new(gateway: PersistenceGateway<S>) -> Self {
        let state = gateway.load();
        Self {
            state,
            gateway,
            activity: PersistenceActivity::Idle,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    pub fn activity(&self) -> PersistenceActivity {
        self.activity
    }

    pub fn current_theme(&self) -> Theme {
        self.state.current_theme()
    }

    fn transact<T>(&mut self, apply: impl FnOnce(&mut AppState) -> Result<T>) -> Result<T> {
        let mut next = self.state.clone();
        let out = apply(&mut next)?;
        self.commit(next);
        Ok(out)
    }

    fn commit(&mut self, next: AppState) {
        debug_assert!(next.validate().is_ok(), "committing an invalid state");
        self.state = next;
        if let Err(e) = self.gateway.save(&self.state) {
            tracing::error!("Failed to save state: {}", e);
        }
    }

    // Repertoires

    pub fn create_repertoire(&mut self, name: &str, perspective: PlayerColor) -> String {
        let mut next = self.state.clone();
        let id = next.create_repertoire(name, perspective);
        self.commit(next);
        id
    }

    pub fn add_move(&mut self, repertoire_id: &str, from_node_id: &str, record: &MoveRecord) -> Result<String> {
        self.transact(|state| state.add_move(repertoire_id, from_node_id, record))
    }

    /// Record `record` from the cursor position and advance onto it.
    pub fn record_move(&mut self, record: &MoveRecord) -> Result<String> {
        self.transact(|state| {
            let (Some(repertoire_id), Some(from)) = (
                state.selected_repertoire_id.clone(),
                state.current_position_node_id.clone(),
            ) else {
                return Err(TrainerError::InvalidPosition("no position selected".to_string()));
            };
            let target = state.add_move(&repertoire_id, &from, record)?;
            state.navigate_to_position(&target)?;
            Ok(target)
        })
    }

    pub fn delete_repertoire(&mut self, id: &str) -> Result<()> {
        self.transact(|state| state.delete_repertoire(id).map(|_| ()))
    }

    pub fn rename_repertoire(&mut self, id: &str, name: &str) -> Result<()> {
        self.transact(|state| state.rename_repertoire(id, name))
    }

    pub fn set_main_line(&mut self, repertoire_id: &str, node_id: &str, uci: &str) -> Result<()> {
        self.transact(|state| state.set_main_line(repertoire_id, node_id, uci))
    }

    // Navigation

    pub fn select_repertoire(&mut self, id: &str) -> Result<()> {
        self.transact(|state| state.select_repertoire(id))
    }

    pub fn navigate_to_position(&mut self, node_id: &str) -> Result<()> {
        self.transact(|state| state.navigate_to_position(node_id))
    }

    pub fn go_to_parent(&mut self) -> bool {
        let mut next = self.state.clone();
        let moved = next.go_to_parent();
        if moved {
            self.commit(next);
        }
        moved
    }

    pub fn go_to_root(&mut self) {
        let mut next = self.state.clone();
        next.go_to_root();
        if next != self.state {
            self.commit(next);
        }
    }

    pub fn play_move(&mut self, uci: &str) -> Result<String> {
        self.transact(|state| state.play_move(uci))
    }

    // Preferences

    pub fn set_light_color(&mut self, color: &str) {
        let mut next = self.state.clone();
        next.preferences.set_light_color(color);
        self.commit(next);
    }

    pub fn set_dark_color(&mut self, color: &str) {
        let mut next = self.state.clone();
        next.preferences.set_dark_color(color);
        self.commit(next);
    }

    pub fn set_board_size(&mut self, px: u32) -> u32 {
        let mut next = self.state.clone();
        let size = next.preferences.set_board_size(px);
        self.commit(next);
        size
    }

    /// Unknown themes are logged and reported; the current theme stays.
    pub fn set_theme(&mut self, name: &str) -> Result<ThemeKey> {
        let result = self.transact(|state| state.preferences.set_theme(name));
        match &result {
            Ok(key) => tracing::info!("Setting theme to: {}", key),
            Err(e) => tracing::warn!("{}", e),
        }
        result
    }

    // Persistence

    pub fn export_state(&mut self) -> Result<String> {
        self.activity = PersistenceActivity::Exporting;
        let result = persistence::export_state(&self.state);
        self.activity = PersistenceActivity::Idle;
        result
    }

    pub fn export_to_file(&mut self, path: &Path) -> Result<()> {
        let document = self.export_state()?;
        std::fs::write(path, document)?;
        tracing::info!("Exported state to {}", path.display());
        Ok(())
    }

    /// Await `source`, then commit the imported state. Existing state is kept
    /// on failure or cancellation.
    pub async fn import_state<I>(&mut self, source: &I) -> Result<ImportOutcome>
    where
        I: ImportSource + ?Sized,
    {
        self.begin_import();
        let result = persistence::import_state(source).await;
        self.apply_import(result)
    }

    /// Mark an import as pending. The caller drives
    /// [`persistence::import_state`] itself and hands the result to
    /// [`TrainerApp::apply_import`], so the app stays readable meanwhile.
    pub fn begin_import(&mut self) {
        self.activity = PersistenceActivity::Importing;
    }

    /// Commit the result of a [`persistence::import_state`] call made elsewhere.
    pub fn apply_import(&mut self, result: Result<Option<AppState>>) -> Result<ImportOutcome> {
        self.activity = PersistenceActivity::Idle;
        match result {
            Ok(Some(state)) => {
                tracing::info!("Imported {} repertoire(s)", state.repertoires.len());
                self.commit(state);
                Ok(ImportOutcome::Replaced)
            }
            Ok(None) => Ok(ImportOutcome::Cancelled),
            Err(e) => {
                tracing::warn!("{}", e);
                Err(e)
            }
        }
    }

    /// Reset to defaults if `confirm` agrees. Returns whether a reset happened.
    pub fn reset_state(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        self.begin_reset();
        self.finish_reset(confirm())
    }

    /// Mark a reset as waiting for the user's answer.
    pub fn begin_reset(&mut self) {
        self.activity = PersistenceActivity::Resetting;
    }

    /// Apply the user's answer to a pending reset.
    pub fn finish_reset(&mut self, confirmed: bool) -> bool {
        if confirmed {
            self.state = self.gateway.reset_state();
            tracing::info!("State reset to defaults");
        } else {
            tracing::debug!("Reset cancelled");
        }
        self.activity = PersistenceActivity::Idle;
        confirmed
    }
}
