use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Board color presets known to the trainer. Keys are matched ignoring case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum ThemeKey {
    #[default]
    Classic,
    Blue,
    Green,
    Brown,
    Purple,
    Grey,
}

impl ThemeKey {
    pub fn all() -> &'static [ThemeKey] {
        &[
            ThemeKey::Classic,
            ThemeKey::Blue,
            ThemeKey::Green,
            ThemeKey::Brown,
            ThemeKey::Purple,
            ThemeKey::Grey,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ThemeKey::Classic => "Classic",
            ThemeKey::Blue => "Blue",
            ThemeKey::Green => "Green",
            ThemeKey::Brown => "Brown",
            ThemeKey::Purple => "Purple",
            ThemeKey::Grey => "Grey",
        }
    }

    pub fn light_square(&self) -> &'static str {
        match self {
            ThemeKey::Classic => "#f0d9b5",
            ThemeKey::Blue => "#dee3e6",
            ThemeKey::Green => "#ffffdd",
            ThemeKey::Brown => "#f0d9b5",
            ThemeKey::Purple => "#e3c1d8",
            ThemeKey::Grey => "#c0c0c0",
        }
    }

    pub fn dark_square(&self) -> &'static str {
        match self {
            ThemeKey::Classic => "#b58863",
            ThemeKey::Blue => "#8ca2ad",
            ThemeKey::Green => "#86a666",
            ThemeKey::Brown => "#946f51",
            ThemeKey::Purple => "#9b5d87",
            ThemeKey::Grey => "#808080",
        }
    }

    pub fn matches(&self, light: &str, dark: &str) -> bool {
        self.light_square().eq_ignore_ascii_case(light)
            && self.dark_square().eq_ignore_ascii_case(dark)
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ThemeKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeKey::all()
            .iter()
            .copied()
            .find(|key| key.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| s.to_string())
    }
}

impl TryFrom<String> for ThemeKey {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
            .map_err(|_| format!("unknown theme \"{}\"", s))
    }
}

/// The colors actually shown on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Theme {
    Preset(ThemeKey),
    /// Literal colors that diverge from the selected preset.
    Custom { light: String, dark: String },
}

impl Theme {
    pub fn name(&self) -> &str {
        match self {
            Theme::Preset(key) => key.label(),
            Theme::Custom { .. } => "Custom",
        }
    }

    pub fn light(&self) -> &str {
        match self {
            Theme::Preset(key) => key.light_square(),
            Theme::Custom { light, .. } => light,
        }
    }

    pub fn dark(&self) -> &str {
        match self {
            Theme::Preset(key) => key.dark_square(),
            Theme::Custom { dark, .. } => dark,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Theme::Custom { .. })
    }
}
