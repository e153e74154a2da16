//! Protocol normalization and dispatch for the exercise recommendation agent.
//!
//! Requests arrive as JSON-RPC 2.0 calls or legacy simple objects; both are
//! reduced to one canonical utterance, handed to a [`RecommendationGenerator`],
//! and answered in the wire format they came in.

pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod format;
pub mod generator;
pub mod topic;
pub mod validate;

pub use dispatch::{CanonicalRequest, DispatchOptions, canonicalize, dispatch};
pub use envelope::{Envelope, ProtocolVariant};
pub use error::{DispatchError, GenerationError, InvalidUtterance};
pub use format::{Reply, ReplyBody};
pub use generator::{GenerationOutcome, Recommendation, RecommendationGenerator};
