// src/geo/mod.rs

pub mod geometry;
pub mod projection;

// src/geo/mod.rs
