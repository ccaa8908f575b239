use serde::Serialize;

use crate::auth::SessionUser;
use crate::models::Consorcio;
use crate::store::theme::{CustomizationState, ThemeMode, ThemePreset};

// ============================================================================
// Slices
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthState {
    /// Never serialized: snapshots may be logged or sent to the UI layer.
    #[serde(skip)]
    pub token: Option<String>,
    pub user: Option<SessionUser>,
    /// Unix seconds.
    pub expires_at: Option<i64>,
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsorcioState {
    pub selected: Option<Consorcio>,
}

impl ConsorcioState {
    pub fn selected_id(&self) -> Option<i64> {
        self.selected.as_ref().map(|c| c.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuState {
    pub drawer_open: bool,
    /// Collapse groups currently expanded.
    pub open_collapses: Vec<String>,
    /// Item id highlighted in the sidebar.
    pub active_item: Option<String>,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            drawer_open: true,
            open_collapses: Vec::new(),
            active_item: Some("dashboard".into()),
        }
    }
}

/// Whole client state. Every field is a slice with its own actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RootState {
    pub auth: AuthState,
    pub consorcio: ConsorcioState,
    pub customization: CustomizationState,
    pub menu: MenuState,
}

// ============================================================================
// Actions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoggedIn {
        token: String,
        user: SessionUser,
        expires_at: i64,
    },
    LoggedOut,
    SelectConsorcio(Consorcio),
    ClearConsorcio,
    SetThemeMode(ThemeMode),
    SetPreset(ThemePreset),
    SetFontFamily(String),
    SetBorderRadius(u8),
    SetContainer(bool),
    SetDrawerOpen(bool),
    ToggleCollapse(String),
    ActivateItem(String),
}

impl Action {
    /// Name for logs; never includes the token.
    pub fn name(&self) -> &'static str {
        match self {
            Action::LoggedIn { .. } => "auth/logged_in",
            Action::LoggedOut => "auth/logged_out",
            Action::SelectConsorcio(_) => "consorcio/select",
            Action::ClearConsorcio => "consorcio/clear",
            Action::SetThemeMode(_) => "customization/mode",
            Action::SetPreset(_) => "customization/preset",
            Action::SetFontFamily(_) => "customization/font_family",
            Action::SetBorderRadius(_) => "customization/border_radius",
            Action::SetContainer(_) => "customization/container",
            Action::SetDrawerOpen(_) => "menu/drawer",
            Action::ToggleCollapse(_) => "menu/toggle_collapse",
            Action::ActivateItem(_) => "menu/activate_item",
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Apply one action. Pure apart from logging.
pub fn reduce(state: &mut RootState, action: Action) {
    match action {
        Action::LoggedIn {
            token,
            user,
            expires_at,
        } => {
            state.auth = AuthState {
                token: Some(token),
                user: Some(user),
                expires_at: Some(expires_at),
            };
        }
        Action::LoggedOut => {
            state.auth = AuthState::default();
            state.consorcio = ConsorcioState::default();
            state.customization.preset = ThemePreset::Default;
        }
        Action::SelectConsorcio(consorcio) => {
            // Theme follows the building.
            state.customization.preset = ThemePreset::from_consorcio_theme(consorcio.theme.as_deref());
            state.consorcio.selected = Some(consorcio);
        }
        Action::ClearConsorcio => {
            state.consorcio.selected = None;
            state.customization.preset = ThemePreset::Default;
        }
        Action::SetThemeMode(mode) => state.customization.mode = mode,
        Action::SetPreset(preset) => state.customization.preset = preset,
        Action::SetFontFamily(font) => state.customization.font_family = font,
        Action::SetBorderRadius(radius) => state.customization.border_radius = radius,
        Action::SetContainer(container) => state.customization.container = container,
        Action::SetDrawerOpen(open) => state.menu.drawer_open = open,
        Action::ToggleCollapse(id) => {
            if let Some(pos) = state.menu.open_collapses.iter().position(|c| *c == id) {
                state.menu.open_collapses.remove(pos);
            } else {
                state.menu.open_collapses.push(id);
            }
        }
        Action::ActivateItem(id) => state.menu.active_item = Some(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consorcio(id: i64, theme: Option<&str>) -> Consorcio {
        Consorcio {
            id,
            nombre: format!("Consorcio {id}"),
            tipo: "edificio".into(),
            theme: theme.map(String::from),
            vencimientos: vec![10],
            ultimo_periodo_liquidado: None,
            domicilio: None,
            customer_id: None,
        }
    }

    fn user() -> SessionUser {
        SessionUser {
            id: "7".into(),
            email: Some("admin@example.com".into()),
            nombre: Some("Admin".into()),
        }
    }

    #[test]
    fn selecting_a_consorcio_recomputes_the_preset() {
        let mut state = RootState::default();
        reduce(&mut state, Action::SelectConsorcio(consorcio(5, Some("theme4"))));
        assert_eq!(state.consorcio.selected_id(), Some(5));
        assert_eq!(state.customization.preset, ThemePreset::Theme4);

        reduce(&mut state, Action::SelectConsorcio(consorcio(6, None)));
        assert_eq!(state.customization.preset, ThemePreset::Default);
    }

    #[test]
    fn logout_clears_session_and_selection() {
        let mut state = RootState::default();
        reduce(
            &mut state,
            Action::LoggedIn {
                token: "t".into(),
                user: user(),
                expires_at: 100,
            },
        );
        reduce(&mut state, Action::SelectConsorcio(consorcio(5, Some("theme2"))));
        reduce(&mut state, Action::SetThemeMode(ThemeMode::Dark));
        reduce(&mut state, Action::LoggedOut);

        assert!(!state.auth.is_logged_in());
        assert!(state.consorcio.selected.is_none());
        assert_eq!(state.customization.preset, ThemePreset::Default);
        // Personal preferences survive logout.
        assert_eq!(state.customization.mode, ThemeMode::Dark);
    }

    #[test]
    fn toggle_collapse_twice_closes() {
        let mut state = RootState::default();
        reduce(&mut state, Action::ToggleCollapse("finanzas".into()));
        assert_eq!(state.menu.open_collapses, vec!["finanzas".to_string()]);
        reduce(&mut state, Action::ToggleCollapse("finanzas".into()));
        assert!(state.menu.open_collapses.is_empty());
    }

    #[test]
    fn token_is_not_serialized() {
        let mut state = RootState::default();
        reduce(
            &mut state,
            Action::LoggedIn {
                token: "secret".into(),
                user: user(),
                expires_at: 100,
            },
        );
        let json = serde_json::to_string(&state).unwrap();
        assert!(!json.contains("secret"));
    }
}
