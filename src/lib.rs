//! ackbanner library
//!
//! Cache-first lookup of the member institution label shown in the
//! acknowledgement banner. Exposes the modules used by the binary and the
//! integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
pub mod page;
pub mod resolver;
