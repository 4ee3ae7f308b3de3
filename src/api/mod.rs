//! Backend API client
//!
//! One client: the url-feed resolver plus the HLS manifest readiness probe.

pub mod urlfeed;

pub use urlfeed::{UrlFeedClient, UrlFeedError};
