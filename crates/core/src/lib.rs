pub mod completion;
pub mod config;
pub mod error;
pub mod index;
pub mod limits;
pub mod logging;
pub mod memory;
pub mod query;
pub mod vocabulary;

pub use completion::{Candidate, Clause, CompletionContext, CompletionEngine, SubKind};
pub use config::PeekConfig;
pub use error::{PeekError, Result};
pub use index::{IndexStats, ModelIndex};
pub use limits::Limits;
pub use memory::{ElementRecord, MemoryModel};
pub use query::{QueryEngine, QueryResult, ReferenceSelector};
pub use vocabulary::Vocabulary;
