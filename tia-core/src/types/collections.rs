//! Collection aliases used across the workspace.
//!
//! FxHash is measurably faster than SipHash for the short identifier keys
//! this engine hashes (method ids, file paths).

pub use rustc_hash::{FxHashMap, FxHashSet};

/// A small vector sized for typical call-path lengths.
pub type PathVec<T> = smallvec::SmallVec<[T; 8]>;
