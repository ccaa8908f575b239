use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Theme customization
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// Color preset of the dashboard. Each consorcio may pick one so the admin
/// can tell buildings apart at a glance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreset {
    #[default]
    Default,
    Theme1,
    Theme2,
    Theme3,
    Theme4,
    Theme5,
    Theme6,
    Theme7,
    Theme8,
}

impl ThemePreset {
    pub const ALL: [ThemePreset; 9] = [
        ThemePreset::Default,
        ThemePreset::Theme1,
        ThemePreset::Theme2,
        ThemePreset::Theme3,
        ThemePreset::Theme4,
        ThemePreset::Theme5,
        ThemePreset::Theme6,
        ThemePreset::Theme7,
        ThemePreset::Theme8,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreset::Default => "default",
            ThemePreset::Theme1 => "theme1",
            ThemePreset::Theme2 => "theme2",
            ThemePreset::Theme3 => "theme3",
            ThemePreset::Theme4 => "theme4",
            ThemePreset::Theme5 => "theme5",
            ThemePreset::Theme6 => "theme6",
            ThemePreset::Theme7 => "theme7",
            ThemePreset::Theme8 => "theme8",
        }
    }

    /// Preset stored on a consorcio. Absent, blank or unknown names fall
    /// back to the default preset.
    pub fn from_consorcio_theme(theme: Option<&str>) -> Self {
        let Some(name) = theme.map(str::trim).filter(|t| !t.is_empty()) else {
            return ThemePreset::Default;
        };
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
            .unwrap_or_else(|| {
                tracing::warn!(theme = name, "Unknown consorcio theme; using default preset");
                ThemePreset::Default
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomizationState {
    pub mode: ThemeMode,
    pub preset: ThemePreset,
    pub font_family: String,
    pub border_radius: u8,
    /// Boxed (fixed-width) layout instead of fluid.
    pub container: bool,
}

impl Default for CustomizationState {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Light,
            preset: ThemePreset::Default,
            font_family: "'Public Sans', sans-serif".into(),
            border_radius: 8,
            container: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_from_consorcio_theme() {
        assert_eq!(ThemePreset::from_consorcio_theme(Some("theme3")), ThemePreset::Theme3);
        assert_eq!(ThemePreset::from_consorcio_theme(Some(" Theme8 ")), ThemePreset::Theme8);
        assert_eq!(ThemePreset::from_consorcio_theme(Some("purple")), ThemePreset::Default);
        assert_eq!(ThemePreset::from_consorcio_theme(Some("")), ThemePreset::Default);
        assert_eq!(ThemePreset::from_consorcio_theme(None), ThemePreset::Default);
    }

    #[test]
    fn serde_names_match_as_str() {
        for preset in ThemePreset::ALL {
            let json = serde_json::to_value(preset).unwrap();
            assert_eq!(json, serde_json::json!(preset.as_str()));
        }
    }
}
