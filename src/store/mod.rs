//! Client application state: auth, selected consorcio, theme customization
//! and menu, updated through reducer-style actions.

mod state;
pub mod theme;

use std::sync::Arc;

use tokio::sync::watch;

pub use state::{reduce, Action, AuthState, ConsorcioState, MenuState, RootState};
pub use theme::{CustomizationState, ThemeMode, ThemePreset};

/// Handle to the shared state container. Cheap to clone; every clone sees
/// the same state.
#[derive(Clone)]
pub struct AppStore {
    tx: Arc<watch::Sender<RootState>>,
}

impl AppStore {
    pub fn new(initial: RootState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn dispatch(&self, action: Action) {
        tracing::debug!(action = action.name(), "dispatch");
        self.tx.send_modify(|state| reduce(state, action));
    }

    /// Clone of the current state.
    pub fn state(&self) -> RootState {
        self.tx.borrow().clone()
    }

    /// Receiver notified after every dispatch.
    pub fn subscribe(&self) -> watch::Receiver<RootState> {
        self.tx.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().auth.token.clone()
    }

    pub fn selected_consorcio_id(&self) -> Option<i64> {
        self.tx.borrow().consorcio.selected_id()
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new(RootState::default())
    }
}
