//! The resolution engine and its builder

mod builder;
mod engine;

pub use builder::{Muninn, MuninnBuilder};
pub use engine::{CachedObject, CachedPayload, Resolver};
