//! docsight - document intelligence and analysis service.
//!
//! Ingests stored documents (PDF, scanned image or plain text) and produces
//! a structured analysis: extracted text, category, named entities, summary
//! and an anomaly verdict. Analytical capabilities sit behind dual
//! simulated/real backend ports selected once at startup, so the service
//! degrades gracefully when external models are unavailable.

pub mod analysis;
pub mod backends;
pub mod cli;
pub mod config;
pub mod extract;
pub mod models;
pub mod search;
pub mod server;
pub mod storage;
pub mod text;
pub mod utils;
