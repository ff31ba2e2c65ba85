pub mod error;
pub mod model;
pub mod selector;
pub mod value;

// Re-export commonly used types
pub use error::{ApiError, ApiResult};
pub use model::{ElementId, Model, PropertySets};
pub use selector::SelectorEvaluator;
pub use value::{ElementRef, Shape, Value};
