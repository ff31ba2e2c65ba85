//! Context-aware completion for the filter and value clauses of a query.
//!
//! A request flows classifier → resolver → assembler: the classifier reads
//! the text before the cursor, the resolver for that position proposes raw
//! candidates, and the assembler prefix-filters and orders them.

mod assembler;
mod context;
mod engine;
mod path;
mod resolver;

pub use assembler::{assemble, Candidate};
pub use context::{byte_offset, classify, Clause, CompletionContext, SubKind, CLAUSE_SEPARATOR};
pub use engine::CompletionEngine;
pub use resolver::{filter_before_comparison, filter_before_set_reference, narrowing_filter};
