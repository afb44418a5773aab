//! Public types for the Muninn API.

mod delivery;
mod interval;
mod options;
mod recency;
mod request;
mod status;

pub use delivery::{Delivery, Resolution, ResponseParts};
pub use interval::RedispatchInterval;
pub use options::FetchOptions;
pub use recency::CacheRecency;
pub use request::{Method, RequestDescriptor};
pub use status::ResolutionStatus;
