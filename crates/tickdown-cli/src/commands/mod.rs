mod common;

pub mod config;
pub mod profile;
pub mod report;
pub mod task;
pub mod watch;
