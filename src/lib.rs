pub mod app;
pub mod badge;
pub mod cli;
pub mod config;
pub mod directory;
pub mod loader;
pub mod model;
pub mod output;
pub mod tui;

#[cfg(test)]
mod tests;
