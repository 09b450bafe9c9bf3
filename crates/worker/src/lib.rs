#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Verification worker for fixity
//!
//! Ties the pieces together: [`ChunkedDigestVerifier`] re-downloads an
//! upload's chunks in ascending-number order and folds them into a
//! whole-file MD5, [`ReportWorkflow`] drives one file version from lookup
//! to digest submission, and [`QueueWorker`] runs one workflow per queue
//! delivery and maps the result to ack or reject.

mod verifier;
mod worker;
mod workflow;

pub use verifier::ChunkedDigestVerifier;
pub use worker::{DrainSummary, Outcome, QueueWorker};
pub use workflow::ReportWorkflow;
