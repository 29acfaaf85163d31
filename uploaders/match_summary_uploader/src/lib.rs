pub mod assembler;
pub mod clips;
pub mod config;
pub mod document_store;
pub mod error;
pub mod local_stats;
pub mod pipeline;
pub mod replay_decoder;
pub mod storage;
pub mod types;
pub mod upload;
