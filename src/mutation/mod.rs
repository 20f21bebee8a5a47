//! Optimistic mutation lifecycle: submit, snapshot/rollback, park-offline,
//! and the resume protocol that replays durable intents after reconnect or
//! restart.

mod controller;
mod types;

pub use controller::MutationController;
pub use types::{MutationControllerOptions, ResumeReport, SubmitOutcome};
