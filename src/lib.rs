//! # email-warden core
//!
//! A concurrent email verification engine. For each candidate address the
//! engine runs syntactic classification, mail-exchange resolution, a live
//! SMTP recipient probe with catch-all detection, and a parameterized risk
//! scoring pass, then streams one explained verdict per address in
//! completion order.
//!
//! Verification is probabilistic by nature: an SMTP acceptance before DATA
//! is strong but not conclusive evidence, and some receivers accept
//! everything. The verdict's signals record exactly which evidence fired.
//!
//! ## Example
//!
//! ```no_run
//! use email_warden_core::{Config, DnsResolver, Engine, SmtpProber};
//! use std::sync::Arc;
//!
//! # async fn run() -> email_warden_core::Result<()> {
//! let config = Arc::new(Config::default());
//! let resolver = DnsResolver::from_config(&config)?;
//! let prober = Arc::new(SmtpProber::new(config.clone()));
//! let engine = Engine::new(config, resolver, prober);
//!
//! let handle = engine.run(vec!["john@example.com".to_string()], 4);
//! for verdict in handle.wait().await {
//!     println!("{} -> {} ({})", verdict.address, verdict.disposition, verdict.score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod core;
pub mod engine;
pub mod scoring;
pub mod utils;

pub use crate::core::config::{Config, ConfigBuilder};
pub use crate::core::error::{AppError, Result};
pub use crate::core::models::{Disposition, RunEvent, RunStats, Signal, Verdict};
pub use crate::classify::{Classification, Classifier};
pub use crate::engine::{Engine, ResultSink, RunHandle, VerdictStore};
pub use crate::scoring::{DomainProbeResult, ScoringPolicy};
pub use crate::utils::dns::{DnsResolver, MailHostResolver};
pub use crate::utils::smtp::{ProbeDisposition, ProbeReport, RecipientProber, SmtpProber};
