//! Semantic search over a tabular dataset with an on-disk embedding cache,
//! plus a chat-model recommendation on top of the best matches.

pub mod cli;
pub mod config;
pub mod data;
pub mod embeddings;
pub mod llm;
pub mod recommend;
pub mod ui;
