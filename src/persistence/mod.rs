//! Durable storage of the application state plus versioned export and import.
//!
//! The durable entry is read leniently: anything missing, unparsable or
//! structurally broken degrades to the default state. Imports are strict: a
//! document is accepted only when its schema version is known and every
//! repertoire passes validation.

mod source;
mod storage;

pub use source::{FileImportSource, ImportSource};
pub use storage::{FileStorage, MemoryStorage, Storage, STORAGE_KEY};

use crate::error::{Result, TrainerError};
use crate::preferences::Preferences;
use crate::repertoire::Repertoire;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version written by [`export_state`].
pub const CURRENT_SCHEMA_VERSION: u64 = 1;
pub const SUPPORTED_SCHEMA_VERSIONS: &[u64] = &[1];

/// Portable export of preferences and repertoires. The cursor is not exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub schema_version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub repertoires: Vec<Repertoire>,
}

impl ExportDocument {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            exported_at: Some(Utc::now()),
            preferences: state.preferences.clone(),
            repertoires: state.repertoires.clone(),
        }
    }

    pub fn into_state(self) -> AppState {
        AppState {
            repertoires: self.repertoires,
            preferences: self.preferences,
            ..AppState::default()
        }
    }
}

pub struct PersistenceGateway<S: Storage> {
    storage: S,
}

impl<S: Storage> PersistenceGateway<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the durable state, falling back to defaults on any problem.
    pub fn load(&self) -> AppState {
        match self.try_load() {
            Ok(Some(state)) => {
                tracing::info!("Loaded {} repertoire(s)", state.repertoires.len());
                state
            }
            Ok(None) => {
                tracing::info!("No saved state, starting fresh");
                AppState::default()
            }
            Err(e) => {
                tracing::warn!("{}; starting from defaults", e);
                AppState::default()
            }
        }
    }

    fn try_load(&self) -> Result<Option<AppState>> {
        let contents = match self.storage.read() {
            Ok(Some(contents)) => contents,
            Ok(None) => return Ok(None),
            Err(e) => return Err(TrainerError::StorageCorrupt(e.to_string())),
        };

        let mut state: AppState = serde_json::from_str(&contents)
            .map_err(|e| TrainerError::StorageCorrupt(e.to_string()))?;
        state.repair_cursor();
        state
            .validate()
            .map_err(|e| TrainerError::StorageCorrupt(e.to_string()))?;
        Ok(Some(state))
    }

    /// Replace the durable entry with `state`.
    pub fn save(&self, state: &AppState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.storage.write(&json)?;
        Ok(())
    }

    /// Drop the durable entry and hand back a fresh default state.
    pub fn reset_state(&self) -> AppState {
        if let Err(e) = self.storage.clear() {
            tracing::error!("Failed to clear stored state: {}", e);
        }
        AppState::default()
    }
}

/// Serialize preferences and repertoires as a versioned, pretty-printed document.
pub fn export_state(state: &AppState) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ExportDocument::from_state(state))?)
}

/// Wait for the source, then parse and validate what it produced.
///
/// `Ok(None)` means the user cancelled. On `Ok(Some(_))` the caller commits and
/// persists the returned state; on error the caller's state stays as it was.
pub async fn import_state<I>(source: &I) -> Result<Option<AppState>>
where
    I: ImportSource + ?Sized,
{
    let text = match source.select_and_read().await {
        Ok(Some(text)) => text,
        Ok(None) => {
            tracing::info!("Import cancelled");
            return Ok(None);
        }
        Err(e) => return Err(TrainerError::Import(format!("could not read document: {}", e))),
    };

    parse_import(&text).map(Some)
}

/// Validate an export document and turn it into an application state.
pub fn parse_import(text: &str) -> Result<AppState> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| TrainerError::Import(format!("not a JSON document: {}", e)))?;

    let version = value
        .get("schemaVersion")
        .ok_or_else(|| TrainerError::Import("missing schemaVersion".to_string()))?;
    let version = version
        .as_u64()
        .ok_or_else(|| TrainerError::Import(format!("schemaVersion {} is not an integer", version)))?;
    if !SUPPORTED_SCHEMA_VERSIONS.contains(&version) {
        return Err(TrainerError::Import(format!(
            "unsupported schemaVersion {}",
            version
        )));
    }

    let document: ExportDocument = serde_json::from_value(value)
        .map_err(|e| TrainerError::Import(format!("malformed document: {}", e)))?;
    let state = document.into_state();
    state
        .validate()
        .map_err(|e| TrainerError::Import(e.to_string()))?;

    tracing::info!(
        "Parsed import with {} repertoire(s), schema version {}",
        state.repertoires.len(),
        version
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Board, PlayerColor};
    use crate::preferences::ThemeKey;
    use async_trait::async_trait;
    use std::io;

    struct TextSource(Option<String>);

    #[async_trait]
    impl ImportSource for TextSource {
        async fn select_and_read(&self) -> io::Result<Option<String>> {
            Ok(self.0.clone())
        }
    }

    fn sample_state() -> AppState {
        let mut state = AppState::default();
        let id = state.create_repertoire("Italian", PlayerColor::White);
        let e4 = Board::default().play("e4").unwrap();
        let node = state.add_move(&id, "n0", &e4).unwrap();
        state.select_repertoire(&id).unwrap();
        state.navigate_to_position(&node).unwrap();
        state.preferences.set_theme("Blue").unwrap();
        state
    }

    #[test]
    fn test_load_without_entry_gives_defaults() {
        let gateway = PersistenceGateway::new(MemoryStorage::default());
        assert_eq!(gateway.load(), AppState::default());
    }

    #[test]
    fn test_save_then_load_is_idempotent() {
        let gateway = PersistenceGateway::new(MemoryStorage::default());
        gateway.save(&sample_state()).unwrap();

        let first = gateway.load();
        gateway.save(&first).unwrap();
        let second = gateway.load();

        assert_eq!(first, second);
        assert_eq!(first.repertoires.len(), 1);
        assert!(first.current_node().is_some());
    }

    #[test]
    fn test_corrupt_entry_falls_back_to_defaults() {
        let gateway = PersistenceGateway::new(MemoryStorage::with_contents("{not json"));
        assert_eq!(gateway.load(), AppState::default());
    }

    #[test]
    fn test_invariant_violation_falls_back_to_defaults() {
        let mut state = sample_state();
        state.repertoires[0].root_node_id = "ghost".to_string();
        let json = serde_json::to_string(&state).unwrap();

        let gateway = PersistenceGateway::new(MemoryStorage::with_contents(json));
        assert_eq!(gateway.load(), AppState::default());
    }

    #[test]
    fn test_dangling_selection_is_cleared_on_load() {
        let gateway = PersistenceGateway::new(MemoryStorage::with_contents(
            r#"{"selectedRepertoireId":"ghost","currentPositionNodeId":null,"repertoires":[]}"#,
        ));
        let state = gateway.load();
        assert_eq!(state.selected_repertoire_id, None);
        assert_eq!(state.current_position_node_id, None);
    }

    #[test]
    fn test_stale_cursor_keeps_repertoires_on_load() {
        let mut state = sample_state();
        state.current_position_node_id = Some("n99".to_string());
        let json = serde_json::to_string(&state).unwrap();

        let loaded = PersistenceGateway::new(MemoryStorage::with_contents(json)).load();

        assert_eq!(loaded.repertoires, state.repertoires);
        assert_eq!(loaded.selected_repertoire_id, None);
        assert_eq!(loaded.current_position_node_id, None);
    }

    #[test]
    fn test_file_backed_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let state = sample_state();
        PersistenceGateway::new(FileStorage::new(dir.path()))
            .save(&state)
            .unwrap();

        let loaded = PersistenceGateway::new(FileStorage::new(dir.path())).load();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_reset_clears_entry() {
        let gateway = PersistenceGateway::new(MemoryStorage::default());
        gateway.save(&sample_state()).unwrap();

        let fresh = gateway.reset_state();

        assert_eq!(fresh, AppState::default());
        assert_eq!(gateway.storage().contents(), None);
        assert_eq!(gateway.load(), AppState::default());
    }

    #[test]
    fn test_export_document_shape() {
        let json = export_state(&sample_state()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["schemaVersion"], 1);
        assert_eq!(value["preferences"]["theme"], "Blue");
        assert_eq!(value["repertoires"][0]["name"], "Italian");
        assert!(value.get("selectedRepertoireId").is_none());
    }

    #[test]
    fn test_export_then_import_restores_content() {
        let state = sample_state();
        let imported = parse_import(&export_state(&state).unwrap()).unwrap();

        assert_eq!(imported.repertoires, state.repertoires);
        assert_eq!(imported.preferences, state.preferences);
        assert_eq!(imported.selected_repertoire_id, None);
        assert_eq!(imported.current_position_node_id, None);
    }

    #[test]
    fn test_import_requires_schema_version() {
        let result = parse_import(r#"{"preferences": {}, "repertoires": []}"#);
        assert!(matches!(result, Err(TrainerError::Import(ref m)) if m.contains("schemaVersion")));
    }

    #[test]
    fn test_import_rejects_unknown_or_non_integer_version() {
        assert!(matches!(
            parse_import(r#"{"schemaVersion": 99, "repertoires": []}"#),
            Err(TrainerError::Import(_))
        ));
        assert!(matches!(
            parse_import(r#"{"schemaVersion": "1", "repertoires": []}"#),
            Err(TrainerError::Import(_))
        ));
        assert!(matches!(parse_import("[1, 2"), Err(TrainerError::Import(_))));
    }

    #[test]
    fn test_import_rejects_broken_repertoire() {
        let mut value: serde_json::Value =
            serde_json::from_str(&export_state(&sample_state()).unwrap()).unwrap();
        value["repertoires"][0]["nodes"]["n0"]["moves"][0]["targetNodeId"] = "ghost".into();

        let result = parse_import(&value.to_string());
        assert!(matches!(result, Err(TrainerError::Import(ref m)) if m.contains("ghost")));
    }

    #[test]
    fn test_settings_only_document_is_accepted() {
        let state = parse_import(r##"{"schemaVersion": 1, "preferences": {"theme": "Grey", "lightSquareColor": "#c0c0c0", "darkSquareColor": "#808080"}}"##).unwrap();
        assert!(state.repertoires.is_empty());
        assert_eq!(state.current_theme().name(), "Grey");
    }

    #[test]
    fn test_imported_board_size_is_clamped() {
        let state = parse_import(r#"{"schemaVersion":1,"preferences":{"boardSize":5}}"#).unwrap();
        assert_eq!(state.preferences.board_size, 320);
    }

    #[test]
    fn test_import_accepts_lowercase_theme_key() {
        let state = parse_import(r#"{"schemaVersion":1,"preferences":{"theme":"blue"}}"#).unwrap();
        assert_eq!(state.preferences.theme, ThemeKey::Blue);
    }

    #[tokio::test]
    async fn test_import_cancelled_is_not_an_error() {
        let result = import_state(&TextSource(None)).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_import_through_source() {
        let json = export_state(&sample_state()).unwrap();
        let state = import_state(&TextSource(Some(json))).await.unwrap().unwrap();
        assert_eq!(state.repertoires.len(), 1);
    }
}
