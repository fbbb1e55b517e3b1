//! Blocking client for the Mouser parts-search API.
//!
//! Two read-only request types are supported: an exact
//! manufacturer-part-number search and a free-text keyword search. Both are
//! rate limited to one call per second and parse the JSON envelope into a
//! flat [`PartCandidate`] list; [`select::select_best`] then picks the
//! candidate worth quoting.

pub mod client;
pub mod rate_limit;
pub mod select;

pub use client::{MouserClient, PartCandidate};
pub use rate_limit::RateLimiter;
pub use select::{PREFERRED_PACKAGING, select_best};
