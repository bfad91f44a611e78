//! Error types

mod decode;
mod fetch;
mod router;

pub use decode::*;
pub use fetch::*;
pub use router::*;
