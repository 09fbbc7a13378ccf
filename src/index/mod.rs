//! The offline corpus index: batched embedding, the on-disk vector store,
//! and the brute-force cosine scan that consumes it.

pub mod builder;
pub mod search;
pub mod store;
