//! Command line front end for the rxlabel reconciliation engine.

#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
