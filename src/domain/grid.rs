use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

/// Filter operators. Only case-insensitive substring match is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Contains,
}

impl FilterMode {
    pub fn label(&self) -> &'static str {
        match self {
            FilterMode::Contains => "contains",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnFilter {
    pub key: String,
    pub mode: FilterMode,
    pub value: String,
}

impl ColumnFilter {
    pub fn contains(key: impl Into<String>, value: impl Into<String>) -> Self {
        ColumnFilter {
            key: key.into(),
            mode: FilterMode::Contains,
            value: value.into(),
        }
    }
}

/// Renders a cell from the whole row, for columns whose display text is
/// computed from more than the keyed field.
pub type CellFormat = fn(&Map<String, Value>) -> String;

/// Per-screen column descriptor. The grid itself knows nothing about
/// domain fields; callers describe each column with one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub visible: bool,
    pub format: Option<CellFormat>,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        ColumnSpec {
            key: key.into(),
            label: label.into(),
            sortable: true,
            visible: true,
            format: None,
        }
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_format(mut self, format: CellFormat) -> Self {
        self.format = Some(format);
        self
    }
}
