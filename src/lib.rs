#![allow(clippy::uninlined_format_args)]

pub mod api;
pub mod app;
pub mod assemble;
pub mod builder;
pub mod config;
pub mod data;
pub mod document;
pub mod logging;
pub mod model;
pub mod node;
pub mod refresh;
pub mod selection;
pub mod toggle;
pub mod ui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
