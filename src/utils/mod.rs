// src/utils/mod.rs

pub mod clock;
pub mod params;
pub mod ticket_id;
