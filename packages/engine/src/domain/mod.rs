//! Site logic outside the tag cloud.

pub mod app_shell;
pub mod blog;
pub mod strategy;
pub mod studio;
pub mod tags;
