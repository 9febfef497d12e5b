//! http handlers for the gateway's external surface.

pub mod cafs;
pub mod companies;
pub mod error;
pub mod health;
pub mod stamps;

pub use error::ApiError;
pub use health::health;
