//! ragbench-vector
//!
//! Brute-force cosine similarity index. Any other backend plugged in
//! through `ragbench_core::VectorStore` must keep the same scoring,
//! tie-break and truncation rules.

pub mod memory;
pub mod similarity;

pub use memory::InMemoryVectorStore;
pub use similarity::cosine_similarity;
