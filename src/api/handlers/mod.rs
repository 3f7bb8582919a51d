//! HTTP request handlers.

pub mod config;
pub mod health;
pub mod mint;
