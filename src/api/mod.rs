pub mod handlers;
pub mod state;
pub mod routes;
pub mod error;

pub use state::{ApiState, AppConfig};
pub use routes::configure_routes;
pub use error::{ApiError, ApiResult};
