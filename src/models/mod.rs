// src/models/mod.rs

pub mod quiz;
pub mod schedule;
pub mod session;
pub mod topic;
pub mod user;
