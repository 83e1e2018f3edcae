#![deny(unsafe_code)]

//! Library side of the `fireems` command line tool.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod summary;
