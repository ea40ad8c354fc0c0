pub mod serde_helpers;
pub mod timing;

pub use timing::{Timer, timed_async};
