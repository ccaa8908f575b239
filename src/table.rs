//! View-model for the generic admin table: search, per-column select
//! filters, sorting, pagination and expandable sub-rows over rows of JSON
//! objects. Owns no server state; row actions are reported to a callback.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Field of the row object rendered in this column.
    pub key: String,
    /// i18n key of the header.
    pub header: String,
    pub searchable: bool,
    /// Offers a select filter built from the column's distinct values.
    pub filterable: bool,
    pub sortable: bool,
}

impl Column {
    pub fn new(key: &str, header: &str) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            searchable: true,
            filterable: false,
            sortable: true,
        }
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn not_searchable(mut self) -> Self {
        self.searchable = false;
        self
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub column: String,
    pub direction: SortDirection,
}

/// What the user asked to do with the data. The owner decides how.
#[derive(Debug, Clone, PartialEq)]
pub enum RowAction {
    Add,
    Edit(Value),
    Delete(Value),
}

type ActionHandler = Box<dyn Fn(RowAction) + Send + Sync>;

pub struct AdminTable {
    columns: Vec<Column>,
    rows: Vec<Value>,
    search: String,
    filters: BTreeMap<String, String>,
    sort: Option<Sort>,
    page: usize,
    page_size: usize,
    /// Field holding each row's nested rows, when the table expands.
    sub_rows_key: Option<String>,
    expanded: BTreeSet<String>,
    on_action: Option<ActionHandler>,
}

impl AdminTable {
    pub fn new(columns: Vec<Column>, rows: Vec<Value>) -> Self {
        Self {
            columns,
            rows,
            search: String::new(),
            filters: BTreeMap::new(),
            sort: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sub_rows_key: None,
            expanded: BTreeSet::new(),
            on_action: None,
        }
    }

    /// Build from typed entities, e.g. the data of a list query.
    pub fn from_entities<T: Serialize>(columns: Vec<Column>, entities: &[T]) -> Result<Self, AppError> {
        let rows = entities
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(columns, rows))
    }

    pub fn with_sub_rows(mut self, key: &str) -> Self {
        self.sub_rows_key = Some(key.into());
        self
    }

    pub fn on_action(mut self, handler: impl Fn(RowAction) + Send + Sync + 'static) -> Self {
        self.on_action = Some(Box::new(handler));
        self
    }

    /// Swap in fresh data (after a refetch) keeping search, filters, sort
    /// and expansion. The page is clamped to the new page count.
    pub fn set_rows(&mut self, rows: Vec<Value>) {
        self.rows = rows;
        self.page = self.page.min(self.page_count().saturating_sub(1));
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    // ========================================================================
    // Search & filters
    // ========================================================================

    pub fn set_search(&mut self, search: &str) {
        self.search = search.trim().to_lowercase();
        self.page = 0;
    }

    /// `None` clears the column's filter.
    pub fn set_filter(&mut self, column: &str, value: Option<&str>) {
        match value {
            Some(v) => {
                self.filters.insert(column.into(), v.into());
            }
            None => {
                self.filters.remove(column);
            }
        }
        self.page = 0;
    }

    /// Distinct non-empty values of a filterable column, sorted.
    pub fn filter_options(&self, column: &str) -> Vec<String> {
        if !self.columns.iter().any(|c| c.key == column && c.filterable) {
            return Vec::new();
        }
        self.rows
            .iter()
            .filter_map(|row| cell_text(row, column))
            .filter(|v| !v.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn matches(&self, row: &Value) -> bool {
        let filters_ok = self
            .filters
            .iter()
            .all(|(col, wanted)| cell_text(row, col).as_deref() == Some(wanted.as_str()));
        if !filters_ok {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        self.columns
            .iter()
            .filter(|c| c.searchable)
            .filter_map(|c| cell_text(row, &c.key))
            .any(|text| text.to_lowercase().contains(&self.search))
    }

    // ========================================================================
    // Sorting
    // ========================================================================

    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    /// Cycle a column through ascending, descending and unsorted.
    pub fn toggle_sort(&mut self, column: &str) {
        if !self.columns.iter().any(|c| c.key == column && c.sortable) {
            return;
        }
        self.sort = match self.sort.take() {
            Some(Sort {
                column: ref current,
                direction: SortDirection::Asc,
            }) if current == column => Some(Sort {
                column: column.into(),
                direction: SortDirection::Desc,
            }),
            Some(Sort {
                column: ref current,
                direction: SortDirection::Desc,
            }) if current == column => None,
            _ => Some(Sort {
                column: column.into(),
                direction: SortDirection::Asc,
            }),
        };
    }

    /// Filtered and sorted rows, before pagination.
    pub fn visible_rows(&self) -> Vec<&Value> {
        let mut rows: Vec<&Value> = self.rows.iter().filter(|r| self.matches(r)).collect();
        if let Some(sort) = &self.sort {
            rows.sort_by(|a, b| compare_cells(a.get(&sort.column), b.get(&sort.column), sort.direction));
        }
        rows
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
        self.page = 0;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.min(self.page_count().saturating_sub(1));
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// At least one page, even when empty.
    pub fn page_count(&self) -> usize {
        let total = self.visible_rows().len();
        total.div_ceil(self.page_size).max(1)
    }

    pub fn page_rows(&self) -> Vec<&Value> {
        self.visible_rows()
            .into_iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .collect()
    }

    // ========================================================================
    // Expandable sub-rows
    // ========================================================================

    pub fn toggle_expanded(&mut self, row: &Value) {
        let Some(id) = row_id(row) else { return };
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    pub fn is_expanded(&self, row: &Value) -> bool {
        row_id(row).is_some_and(|id| self.expanded.contains(&id))
    }

    /// Nested rows of an expanded row; empty when collapsed.
    pub fn sub_rows<'a>(&self, row: &'a Value) -> &'a [Value] {
        let Some(key) = &self.sub_rows_key else { return &[] };
        if !self.is_expanded(row) {
            return &[];
        }
        row.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
    }

    // ========================================================================
    // Row actions
    // ========================================================================

    pub fn request(&self, action: RowAction) {
        match &self.on_action {
            Some(handler) => handler(action),
            None => tracing::debug!(?action, "Table action without handler"),
        }
    }
}

fn row_id(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Text shown for a cell; `None` for missing or null.
fn cell_text(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Numbers numerically, strings case-insensitively, nulls last in both
/// directions. Numbers sort before text when a column mixes them.
fn compare_cells(a: Option<&Value>, b: Option<&Value>, direction: SortDirection) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };
    let ord = match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::Number(_), _) => Ordering::Less,
        (_, Value::Number(_)) => Ordering::Greater,
        (Value::String(x), Value::String(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (x, y) => x.to_string().to_lowercase().cmp(&y.to_string().to_lowercase()),
    };
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}
