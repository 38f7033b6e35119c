//! SMTP recipient probing: transient sessions, catch-all detection, and the
//! result types consumed by the scorer.

pub mod client;
pub mod result;

pub use client::{RecipientProber, SmtpProber};
pub use result::{ProbeDisposition, ProbeReport};
