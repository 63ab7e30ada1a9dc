// src/data_input/mod.rs

pub mod country_data;
pub mod csv_parser;

// src/data_input/mod.rs
