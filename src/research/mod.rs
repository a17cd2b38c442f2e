//! Research orchestration module
//!
//! Runs the plan → parallel search → write → persist pipeline for a query
//! against three pluggable capabilities.

mod error;
mod manager;
mod models;
mod progress;
mod traits;

pub use error::ResearchError;
pub use manager::{ResearchManager, EMPTY_QUERY_ADVISORY};
pub use models::*;
pub use progress::{progress_channel, Progress, ProgressEvent, ProgressReceiver, ProgressSender};
pub use traits::{Plans, Searches, Writes};
