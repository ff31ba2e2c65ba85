use crate::completion::CLAUSE_SEPARATOR;
use crate::query::model::{QueryResult, QueryRow};
use modelpeek_api::{ApiResult, Model, SelectorEvaluator};
use std::sync::Arc;
use tracing::debug;

/// Runs complete queries of the form `filter ; path ; path ...`.
#[derive(Clone)]
pub struct QueryEngine {
    model: Arc<dyn Model>,
    evaluator: Arc<dyn SelectorEvaluator>,
}

impl QueryEngine {
    pub fn new(model: Arc<dyn Model>, evaluator: Arc<dyn SelectorEvaluator>) -> Self {
        Self { model, evaluator }
    }

    /// Filter errors are returned; a value path that fails on one element
    /// leaves that cell empty.
    pub fn execute(&self, query: &str) -> ApiResult<QueryResult> {
        let mut clauses = query.split(CLAUSE_SEPARATOR);
        let filter = clauses.next().unwrap_or_default();
        let value_paths: Vec<String> = clauses
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(String::from)
            .collect();

        let elements = self.evaluator.filter(self.model.as_ref(), filter)?;
        let mut rows = Vec::with_capacity(elements.len());
        for element in elements {
            let type_name = self.model.type_name(element)?;
            let values = value_paths
                .iter()
                .map(|path| {
                    match self.evaluator.get_value(self.model.as_ref(), element, path) {
                        Ok(value) => value.to_string(),
                        Err(e) => {
                            debug!("{} on {}: {}", path, element, e);
                            String::new()
                        }
                    }
                })
                .collect();
            rows.push(QueryRow {
                element,
                type_name,
                values,
            });
        }

        Ok(QueryResult { value_paths, rows })
    }
}
