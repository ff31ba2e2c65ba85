use modelpeek_api::ElementId;
use serde::{Deserialize, Serialize};

/// One selected element, with its value columns when the query had any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRow {
    pub element: ElementId,
    pub type_name: String,
    pub values: Vec<String>,
}

/// The result of running a full query (filter plus optional value paths).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    pub value_paths: Vec<String>,
    pub rows: Vec<QueryRow>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_values(&self) -> bool {
        !self.value_paths.is_empty()
    }
}
