pub mod routes;
pub mod server;
pub mod state;

mod error;

pub use error::{Result, WebError};
pub use server::{build_router, normalize_prefix, start_server};
pub use state::AppState;
