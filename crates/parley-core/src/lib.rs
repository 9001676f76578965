//! Shared primitives for the Parley workspace

mod error;

pub use error::{ErrorEnvelope, HttpError};
