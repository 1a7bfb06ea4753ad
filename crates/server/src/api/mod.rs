pub mod assets;
pub mod error;
pub mod generate;
pub mod handlers;
pub mod middleware;
pub mod publish;
pub mod routes;
pub mod search;
pub mod session;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
