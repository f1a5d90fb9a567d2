pub mod browse;
pub mod clear;
pub mod config;
pub mod context;
pub mod prompts;
pub mod render;
pub mod search;
pub mod show;
pub mod ui;
pub mod watched;
