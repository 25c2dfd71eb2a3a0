//! Domain models for the document assistant.
//!
//! # Core Concepts
//!
//! - [`Session`]: One uploaded document plus everything derived from it. Lives
//!   in memory for the lifetime of the process; there is no durability.
//! - [`QuestionSet`]: The `q1..qN` challenge prompts generated for a session.
//! - [`AnswerSet`]: User answers keyed by the same question keys.
//! - [`FeedbackMap`]: Per-question [`Feedback`] plus an aggregate under
//!   [`OVERALL_KEY`]. Always complete, whatever the generation backend did.
//!
//! Request/response bodies for the HTTP API sit next to the model they carry.

mod challenge;
mod qa;
mod session;

pub use challenge::*;
pub use qa::*;
pub use session::*;
