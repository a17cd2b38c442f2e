//! Search engine module
//!
//! Scrapeable web search engines used by the engine-backed searcher.

mod traits;

pub mod duckduckgo;

pub use duckduckgo::DuckDuckGo;
pub use traits::*;
