pub mod backend;
pub mod commands;
pub mod config;
pub mod logging;
pub mod payload;
pub mod render;
pub mod sections;
pub mod session;
pub mod widgets;
