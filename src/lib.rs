pub mod adguard;
pub mod common;
pub mod config;
pub mod panel;

pub use self::config::*;
