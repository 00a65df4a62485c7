//! Core of a chess opening repertoire trainer.
//!
//! Repertoires are graphs of positions linked by moves, navigated with a
//! cursor and persisted as a single JSON entry that can also be exported and
//! imported as a versioned document. Chess legality is delegated to
//! [`game::Board`].

pub mod app;
pub mod config;
pub mod error;
pub mod game;
pub mod navigation;
pub mod persistence;
pub mod preferences;
pub mod repertoire;
pub mod shell;
pub mod state;

pub use app::{ImportOutcome, PersistenceActivity, TrainerApp};
pub use error::TrainerError;
pub use state::AppState;
