//! HTTP networking module
//!
//! One pooled client serves both the LLM provider and the scraping engines.

mod client;
mod user_agent;

pub use client::HttpClient;
pub use user_agent::generate_user_agent;
