// src/config/mod.rs
pub mod settings;

pub use settings::{EmailSettings, Settings};
