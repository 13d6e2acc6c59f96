pub mod error;
pub mod merger;
pub mod model;
pub mod reducer;

pub use error::DispatchError;
