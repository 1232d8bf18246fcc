//! Core library for player-page-sync
pub mod config;
pub mod models;
pub mod scanner;
pub mod cover;
pub mod markup;
pub mod backup;
pub mod sync;
