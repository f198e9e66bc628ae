//! Courier - minimal HTTP/1.1 server
//!
//! Core library for request parsing, routing and response building.

pub mod config;
pub mod handlers;
pub mod http;
pub mod server;
