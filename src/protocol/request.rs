//! Read request envelope

use serde::{Deserialize, Serialize};

use super::ast::Predicate;

/// Caller's tolerance for an incompletely pushed-down filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilteringMode {
    #[default]
    Unspecified,
    /// The filter must be honored exactly
    Mandatory,
    /// Best effort; the engine filters again downstream
    Optional,
}

impl FilteringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilteringMode::Unspecified => "unspecified",
            FilteringMode::Mandatory => "mandatory",
            FilteringMode::Optional => "optional",
        }
    }
}

/// Pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    #[serde(default)]
    pub offset: u64,
    pub limit: u64,
}

/// What to read: projected columns, pagination and filter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Select {
    /// Projected column names
    #[serde(default)]
    pub what: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<Limit>,
    #[serde(default, rename = "where")]
    pub filter: Option<Predicate>,
}

impl Select {
    /// Creates a select over the given columns
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            what: Some(columns.into_iter().map(Into::into).collect()),
            limit: None,
            filter: None,
        }
    }

    /// Sets the pagination window
    pub fn with_limit(mut self, offset: u64, limit: u64) -> Self {
        self.limit = Some(Limit { offset, limit });
        self
    }

    /// Sets the filter predicate
    pub fn with_filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }
}

/// A read request as delivered by the transport layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadRequest {
    pub select: Select,
    #[serde(default)]
    pub filtering: FilteringMode,
}

impl ReadRequest {
    pub fn new(select: Select, filtering: FilteringMode) -> Self {
        Self { select, filtering }
    }
}
