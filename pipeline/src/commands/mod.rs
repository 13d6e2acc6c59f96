mod merge;
mod reduce;

pub use merge::merge;
pub use reduce::reduce;
