//! Console and HTTP front ends for [`crate::evaluate`], plus the
//! configuration, logging and audit plumbing they share.

pub mod audit;
pub mod config;
pub mod console;
pub mod http;
pub mod logging;
pub mod server;

mod error;

pub use error::ApplicationError;
