pub mod types;

#[cfg(feature = "axum_api")]
pub mod axum;

pub use types::*;
