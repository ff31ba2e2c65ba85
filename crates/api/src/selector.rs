use crate::ApiResult;
use crate::model::{ElementId, Model};
use crate::value::Value;

/// Executes filter and value-path expressions against a model.
///
/// Both operations fail with [`crate::ApiError::Evaluation`] on malformed input.
pub trait SelectorEvaluator: Send + Sync {
    /// Elements matching `filter_clause`, in evaluation order.
    fn filter(&self, model: &dyn Model, filter_clause: &str) -> ApiResult<Vec<ElementId>>;

    /// Resolves a dotted value path starting at `element`.
    fn get_value(&self, model: &dyn Model, element: ElementId, path: &str) -> ApiResult<Value>;
}
