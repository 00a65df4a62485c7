mod theme;

pub use theme::{Theme, ThemeKey};

use crate::error::{Result, TrainerError};
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::RangeInclusive;

pub const DEFAULT_BOARD_SIZE: u32 = 480;
pub const BOARD_SIZE_RANGE: RangeInclusive<u32> = 320..=800;

/// Board appearance settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub light_square_color: String,
    pub dark_square_color: String,
    #[serde(deserialize_with = "deserialize_board_size")]
    pub board_size: u32,
    pub theme: ThemeKey,
}

fn clamp_board_size(px: u32) -> u32 {
    px.clamp(*BOARD_SIZE_RANGE.start(), *BOARD_SIZE_RANGE.end())
}

/// Stored sizes obey the same bounds as [`Preferences::set_board_size`].
fn deserialize_board_size<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    u32::deserialize(deserializer).map(clamp_board_size)
}

impl Default for Preferences {
    fn default() -> Self {
        let theme = ThemeKey::default();
        Self {
            light_square_color: theme.light_square().to_string(),
            dark_square_color: theme.dark_square().to_string(),
            board_size: DEFAULT_BOARD_SIZE,
            theme,
        }
    }
}

impl Preferences {
    pub fn set_light_color(&mut self, color: impl Into<String>) {
        self.light_square_color = color.into();
    }

    pub fn set_dark_color(&mut self, color: impl Into<String>) {
        self.dark_square_color = color.into();
    }

    /// Stores `px` clamped into [`BOARD_SIZE_RANGE`] and returns the stored value.
    pub fn set_board_size(&mut self, px: u32) -> u32 {
        self.board_size = clamp_board_size(px);
        self.board_size
    }

    /// Select a preset by name and apply its colors. Unknown names leave
    /// everything untouched.
    pub fn set_theme(&mut self, name: &str) -> Result<ThemeKey> {
        let key: ThemeKey = name
            .parse()
            .map_err(|_| TrainerError::ThemeNotFound(name.to_string()))?;

        self.theme = key;
        self.light_square_color = key.light_square().to_string();
        self.dark_square_color = key.dark_square().to_string();
        Ok(key)
    }

    /// The selected preset, or a custom theme when the stored colors no longer match it.
    pub fn current_theme(&self) -> Theme {
        if self
            .theme
            .matches(&self.light_square_color, &self.dark_square_color)
        {
            Theme::Preset(self.theme)
        } else {
            Theme::Custom {
                light: self.light_square_color.clone(),
                dark: self.dark_square_color.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve_to_classic() {
        let prefs = Preferences::default();
        assert_eq!(prefs.current_theme(), Theme::Preset(ThemeKey::Classic));
        assert_eq!(prefs.board_size, 480);
    }

    #[test]
    fn test_set_theme_blue() {
        let mut prefs = Preferences::default();
        prefs.set_theme("Blue").unwrap();
        let theme = prefs.current_theme();
        assert_eq!(theme.light(), "#dee3e6");
        assert_eq!(theme.dark(), "#8ca2ad");
        assert_eq!(theme.name(), "Blue");
    }

    #[test]
    fn test_unknown_theme_is_rejected() {
        let mut prefs = Preferences::default();
        prefs.set_theme("Green").unwrap();
        let before = prefs.clone();

        let result = prefs.set_theme("Nonexistent");

        assert!(matches!(result, Err(TrainerError::ThemeNotFound(ref k)) if k == "Nonexistent"));
        assert_eq!(prefs, before);
        assert_eq!(prefs.theme, ThemeKey::Green);
    }

    #[test]
    fn test_literal_color_override_yields_custom_theme() {
        let mut prefs = Preferences::default();
        prefs.set_theme("Purple").unwrap();
        prefs.set_light_color("#123456");

        let theme = prefs.current_theme();
        assert!(theme.is_custom());
        assert_eq!(theme.light(), "#123456");
        assert_eq!(theme.dark(), ThemeKey::Purple.dark_square());
        assert_eq!(prefs.theme, ThemeKey::Purple);
    }

    #[test]
    fn test_board_size_is_clamped() {
        let mut prefs = Preferences::default();
        assert_eq!(prefs.set_board_size(100), 320);
        assert_eq!(prefs.set_board_size(2000), 800);
        assert_eq!(prefs.set_board_size(640), 640);
    }

    #[test]
    fn test_stored_board_size_is_clamped() {
        let small: Preferences = serde_json::from_str(r#"{"boardSize": 5}"#).unwrap();
        assert_eq!(small.board_size, 320);
        let large: Preferences = serde_json::from_str(r#"{"boardSize": 4000}"#).unwrap();
        assert_eq!(large.board_size, 800);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let prefs: Preferences = serde_json::from_str(r##"{"boardSize": 560}"##).unwrap();
        assert_eq!(prefs.board_size, 560);
        assert_eq!(prefs.theme, ThemeKey::Classic);
        assert_eq!(prefs.light_square_color, "#f0d9b5");
    }
}
