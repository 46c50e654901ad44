// src/models/mod.rs

pub mod analytics;
pub mod exam;
pub mod lesson;
pub mod practice;
pub mod question;
pub mod topic;
pub mod user;
