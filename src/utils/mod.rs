//! Shared utilities: DNS resolution, SMTP probing, ingestion, and export.

pub mod dns;
pub mod export;
pub mod input;
pub mod smtp;
