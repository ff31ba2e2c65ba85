pub mod engine;
pub mod model;
pub mod selector;

pub use engine::QueryEngine;
pub use model::{QueryResult, QueryRow};
pub use selector::ReferenceSelector;
