// src/handlers/mod.rs

pub mod history;
pub mod results;
pub mod session;
