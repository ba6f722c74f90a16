//! Photometer client
//!
//! Typed client for the photometer photo-gallery service. Every runtime
//! operation is a single request whose answer is either good or bad:
//!
//! - [`activation`]: confirm an account from its activation key
//! - [`gallery`]: fetch a page of photos into an observable collection
//! - [`router`] and [`views`]: map URL fragments to login/registration forms
//! - [`bundle`]: the asset bundle description for the browser build
//!
//! Collaborators ([`request::Transport`], [`reporter::ErrorReporter`],
//! [`session::App`]) are passed in explicitly so flows can be exercised
//! against in-memory doubles.

pub mod activation;
pub mod bundle;
pub mod config;
pub mod error;
pub mod events;
pub mod gallery;
pub mod logging;
pub mod reporter;
pub mod request;
pub mod router;
pub mod session;
pub mod startup;
pub mod util;
pub mod views;

#[cfg(test)]
mod testing;

pub use error::{ClientError, Result};
