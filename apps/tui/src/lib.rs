// ShadowCheck terminal dashboard: library surface shared by the binary and tests
pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod event;
pub mod logging;
pub mod table;
pub mod terminal;
pub mod ui;
