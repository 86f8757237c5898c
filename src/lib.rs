pub mod api;
pub mod config;
pub mod core;
pub mod form;
pub mod schedule;
pub mod watch;
