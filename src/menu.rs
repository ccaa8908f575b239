//! Sidebar navigation as plain data. Rendering (icons, chips, layout) is
//! left to whatever consumes the tree.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::store::{Action, AppStore};

/// One node of the navigation tree. Titles are i18n keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MenuItem {
    /// Titled section; never navigable itself.
    Group {
        id: String,
        title: String,
        children: Vec<MenuItem>,
    },
    /// Expandable entry grouping related pages.
    Collapse {
        id: String,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        children: Vec<MenuItem>,
    },
    /// Navigable page.
    Item {
        id: String,
        title: String,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        /// Page needs a selected consorcio to show anything.
        #[serde(default)]
        requires_consorcio: bool,
    },
}

impl MenuItem {
    pub fn group(id: &str, children: Vec<MenuItem>) -> Self {
        MenuItem::Group {
            id: id.into(),
            title: id.into(),
            children,
        }
    }

    pub fn collapse(id: &str, icon: &str, children: Vec<MenuItem>) -> Self {
        MenuItem::Collapse {
            id: id.into(),
            title: id.into(),
            icon: Some(icon.into()),
            children,
        }
    }

    pub fn item(id: &str, url: &str, icon: &str) -> Self {
        MenuItem::Item {
            id: id.into(),
            title: id.into(),
            url: url.into(),
            icon: Some(icon.into()),
            requires_consorcio: false,
        }
    }

    /// Same item, hidden until a consorcio is selected.
    pub fn scoped(mut self) -> Self {
        if let MenuItem::Item {
            ref mut requires_consorcio,
            ..
        } = self
        {
            *requires_consorcio = true;
        }
        self
    }

    pub fn id(&self) -> &str {
        match self {
            MenuItem::Group { id, .. } | MenuItem::Collapse { id, .. } | MenuItem::Item { id, .. } => id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MenuItem::Group { title, .. } | MenuItem::Collapse { title, .. } | MenuItem::Item { title, .. } => title,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            MenuItem::Item { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn children(&self) -> &[MenuItem] {
        match self {
            MenuItem::Group { children, .. } | MenuItem::Collapse { children, .. } => children,
            MenuItem::Item { .. } => &[],
        }
    }
}

/// The dashboard's sidebar.
pub fn default_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::group(
            "inicio",
            vec![MenuItem::item("dashboard", "/dashboard/default", "dashboard")],
        ),
        MenuItem::group(
            "administracion",
            vec![
                MenuItem::item("customers", "/admin/customers", "users"),
                MenuItem::item("consorcios", "/admin/consorcios", "building"),
                MenuItem::item("unidades", "/admin/unidades", "door").scoped(),
                MenuItem::item("personas", "/admin/personas", "user").scoped(),
                MenuItem::item("proveedores", "/admin/proveedores", "truck").scoped(),
                MenuItem::item("rubros", "/admin/rubros", "tag").scoped(),
                MenuItem::item("cuentas", "/admin/cuentas", "wallet").scoped(),
            ],
        ),
        MenuItem::group(
            "gestion",
            vec![
                MenuItem::item("gastos", "/gestion/gastos", "receipt").scoped(),
                MenuItem::collapse(
                    "liquidaciones",
                    "calculator",
                    vec![
                        MenuItem::item("liquidaciones-lista", "/gestion/liquidaciones", "list").scoped(),
                        MenuItem::item("deudores", "/gestion/liquidaciones/deudores", "alert").scoped(),
                    ],
                ),
                MenuItem::collapse(
                    "pagos",
                    "cash",
                    vec![
                        MenuItem::item("pagos-proveedores", "/gestion/pagos/proveedores", "truck").scoped(),
                        MenuItem::item("pagos-expensas", "/gestion/pagos/expensas", "home").scoped(),
                    ],
                ),
                MenuItem::item("transacciones", "/gestion/transacciones", "arrows").scoped(),
            ],
        ),
    ]
}

/// Navigable items in display order.
pub fn flatten(tree: &[MenuItem]) -> Vec<&MenuItem> {
    let mut out = Vec::new();
    for node in tree {
        match node {
            MenuItem::Item { .. } => out.push(node),
            _ => out.extend(flatten(node.children())),
        }
    }
    out
}

/// Item whose url equals `url`, ignoring a trailing slash.
pub fn find_by_url<'a>(tree: &'a [MenuItem], url: &str) -> Option<&'a MenuItem> {
    let wanted = url.trim_end_matches('/');
    flatten(tree)
        .into_iter()
        .find(|item| item.url().map(|u| u.trim_end_matches('/')) == Some(wanted))
}

/// Path from the root to the item for `url`, inclusive.
pub fn breadcrumbs<'a>(tree: &'a [MenuItem], url: &str) -> Option<Vec<&'a MenuItem>> {
    let wanted = url.trim_end_matches('/');
    for node in tree {
        if node.url().map(|u| u.trim_end_matches('/')) == Some(wanted) {
            return Some(vec![node]);
        }
        if let Some(mut path) = breadcrumbs(node.children(), url) {
            path.insert(0, node);
            return Some(path);
        }
    }
    None
}

/// Items visible for the current consorcio selection.
pub fn visible_items(tree: &[MenuItem], has_consorcio: bool) -> Vec<&MenuItem> {
    flatten(tree)
        .into_iter()
        .filter(|item| has_consorcio || !matches!(item, MenuItem::Item { requires_consorcio: true, .. }))
        .collect()
}

/// Highlight the item for `url` and expand the collapses above it.
/// Returns false when no item matches.
pub fn activate_url(store: &AppStore, tree: &[MenuItem], url: &str) -> bool {
    let Some(path) = breadcrumbs(tree, url) else {
        tracing::debug!(url, "No menu item for url");
        return false;
    };
    let open = store.state().menu.open_collapses;
    for node in &path {
        if matches!(node, MenuItem::Collapse { .. }) && !open.iter().any(|c| c == node.id()) {
            store.dispatch(Action::ToggleCollapse(node.id().to_string()));
        }
    }
    if let Some(item) = path.last() {
        store.dispatch(Action::ActivateItem(item.id().to_string()));
    }
    true
}
