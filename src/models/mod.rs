// src/models/mod.rs

pub mod redemption;
pub mod score_record;
pub mod ticket;
