// src/validation/mod.rs

pub mod plan;
