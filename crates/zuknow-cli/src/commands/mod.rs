//! Command handlers

pub mod config;
pub mod question;
pub mod quiz;
pub mod stats;
pub mod status;
pub mod transfer;
