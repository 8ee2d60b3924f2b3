//! Request/response model and network access
//!
//! Requests are keyed by their absolute URL (fragment stripped), which is
//! also the key used by every cache store.

pub mod network;
pub mod request;
pub mod response;

pub use network::{HttpNetwork, Network, OfflineNetwork};
pub use request::{Destination, Method, Request};
pub use response::{Response, ResponseSource};

#[cfg(test)]
pub(crate) mod scripted;
