//! Reagent Tools
//!
//! Tool implementations for the Reagent agent system.

pub mod crawler;

pub use crawler::{CrawlerError, HttpCrawlerService, WebCrawlerTool};
