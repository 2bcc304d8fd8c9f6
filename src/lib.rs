// Crate root library declaration and module exports.
pub mod access;
pub mod cli;
pub mod config;
pub mod context;
pub mod entry;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod pipeline;
pub mod resolver;
pub mod storage;
pub mod store;
pub mod timeline;
