pub mod types;
pub mod config;
pub mod data;
pub mod description;
pub mod join;
pub mod projection;
pub mod scale;
pub mod format;
pub mod scene;
pub mod render;
pub mod page;
pub mod pipeline;
pub mod server;
