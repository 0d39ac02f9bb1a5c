//! # API Clients
//!
//! Remote service clients consumed by the dispatcher.
//!
//! Responsibilities:
//! - Age lookup (single and per-country batch)
//! - Random joke retrieval
//! - Echo sink submission
//! - Mock implementations with failure injection for tests

pub mod agify;
pub mod echo;
pub mod http;
pub mod joke;
pub mod mock;

pub use agify::AgifyClient;
pub use contracts::{EchoClient, JokeClient, LookupClient, SinkEnvelope, MAX_BATCH_NAMES};
pub use echo::PostmanEchoClient;
pub use http::HttpClient;
pub use joke::JokeApiClient;
pub use mock::{MockEchoClient, MockJokeClient, MockLookupClient, MockLookupConfig};
