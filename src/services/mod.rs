// src/services/mod.rs

pub mod auth;
pub mod progression;
pub mod tutor;
