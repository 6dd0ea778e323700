pub mod cache;
pub mod config;
pub mod deps;
pub mod image;
pub mod logging;
pub mod yt;
