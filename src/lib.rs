mod error;
mod pattern;
mod reduce;
mod report;
mod stats;

pub use error::*;
pub use pattern::*;
pub use reduce::*;
pub use report::*;
pub use stats::*;
