//! Questline daemon: stores, completion trigger, overdue sweep, RPC server.

pub mod config;
pub mod engine;
pub mod handlers;
pub mod rpc_server;
pub mod state;
pub mod store;
pub mod sweep;
