//! Unified-diff parsing into code change sets.

pub mod extract;
pub mod parser;
pub mod source;
pub mod types;

pub use parser::parse_diff;
pub use source::DiffSource;
pub use types::{ChangeType, CodeChange, CodeChangeSet};
