// csvstrip/src/lib.rs
//! # csvstrip CLI Application
//!
//! This crate provides the command-line front end for `csvstrip-core`:
//! argument parsing, config loading, logging setup, file I/O and sink wiring.

pub mod cli;
pub mod commands;
pub mod logger;
