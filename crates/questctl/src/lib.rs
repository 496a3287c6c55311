//! Questline CLI library: argument parsing, RPC client, and rendering.

pub mod cli;
pub mod client;
pub mod display;
