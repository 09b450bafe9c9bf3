#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! DDS API access for fixity
//!
//! This crate wraps the storage service's REST surface behind a typed
//! client: a closed verb set, per-call-site expected status codes, the
//! reason/suggestion error classification rule, and a bearer-token cache
//! that re-authenticates only after expiry.

mod client;
mod token;

pub use client::{ApiClient, HttpConfig, Verb};
pub use token::{is_expired, TokenCache};
