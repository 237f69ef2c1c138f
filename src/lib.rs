pub mod config;
pub mod error;
pub mod lock;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod store;
