// src/handlers/mod.rs

pub mod analytics;
pub mod auth;
pub mod exams;
pub mod lessons;
pub mod practice;
pub mod profile;
pub mod questions;
pub mod topics;
