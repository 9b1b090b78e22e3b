//! GOVDESK Core — domain models, repository trait definitions, the
//! static reference catalog, and shared error types.

pub mod catalog;
pub mod error;
pub mod models;
pub mod repository;

pub use catalog::Catalog;
pub use error::{GovError, GovResult};
