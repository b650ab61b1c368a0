pub mod chunking;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
