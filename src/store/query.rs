use serde::Serialize;

use crate::store::log_entry::LogEntry;
use crate::utils::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// case-insensitive substring over url, message, subject id, status and type
    pub search_term: Option<String>,
}

impl LogFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self { search_term: Some(term.into()) }
    }

    pub(crate) fn term(&self) -> Option<&str> {
        self.search_term.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Sortable columns. Anything else falls back to `notified_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortColumn {
    #[default]
    NotifiedAt,
    SubjectId,
    StatusCode,
}

impl SortColumn {
    pub fn from_param(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "subject_id" | "post_id" => SortColumn::SubjectId,
            "status_code" => SortColumn::StatusCode,
            _ => SortColumn::NotifiedAt,
        }
    }

    pub(crate) fn sql(&self) -> &'static str {
        match self {
            SortColumn::NotifiedAt => "notified_at",
            SortColumn::SubjectId => "subject_id",
            SortColumn::StatusCode => "status_code",
        }
    }
}

/// Invalid input falls back to descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn from_param(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }

    pub(crate) fn sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogSort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl LogSort {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub fn from_params(column: Option<&str>, direction: Option<&str>) -> Self {
        Self {
            column: column.map(SortColumn::from_param).unwrap_or_default(),
            direction: direction.map(SortDirection::from_param).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub size: usize,
    pub offset: usize,
}

impl PageRequest {
    pub fn new(size: usize, offset: usize) -> Self {
        Self { size, offset }
    }

    /// 1-based page number; page 0 is treated as the first page.
    /// Size 0 means the default, anything above `MAX_PAGE_SIZE` is capped.
    pub fn page(number: usize, size: usize) -> Self {
        let size = if size == 0 { DEFAULT_PAGE_SIZE } else { size.min(MAX_PAGE_SIZE) };
        Self { size, offset: number.saturating_sub(1).saturating_mul(size) }
    }

    pub(crate) fn limit(&self) -> usize {
        if self.size == 0 { DEFAULT_PAGE_SIZE } else { self.size }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { size: DEFAULT_PAGE_SIZE, offset: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogPage {
    pub items: Vec<LogEntry>,
    pub total_count: u64,
}
