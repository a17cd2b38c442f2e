//! Web server module
//!
//! Browser UI and JSON API over the research manager and the saved reports.

mod handlers;
mod routes;
mod state;
mod templates;
mod ws;

pub use routes::create_router;
pub use state::AppState;
pub use templates::{markdown_to_html, Templates};
