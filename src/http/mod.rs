//! HTTP protocol implementation.
//!
//! This module implements a minimal HTTP/1.1 server that answers exactly one
//! request per connection.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The per-connection state machine
//! - **`parser`**: Parses a request out of a single read buffer
//! - **`request`**: HTTP request representation
//! - **`response`**: Status codes and the fluent response builder
//! - **`router`**: Ordered route table and first-match dispatcher
//! - **`writer`**: Writes a rendered response to the client
//!
//! # Connection State Machine
//!
//! ```text
//!   ┌─────────────┐
//!   │   Reading   │ ← One read into a fixed-size buffer
//!   └──────┬──────┘
//!          ▼
//!   ┌─────────────┐
//!   │   Parsing   │ ── ParseError ──┐
//!   └──────┬──────┘                 │ 400 Bad Request
//!          ▼                        │
//!   ┌─────────────┐                 │
//!   │ Dispatching │ ← handler / 404 │
//!   └──────┬──────┘                 │
//!          ▼                        │
//!   ┌─────────────┐                 │
//!   │   Writing   │ ◄───────────────┘
//!   └──────┬──────┘
//!          ▼
//!       Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use courier::http::connection::Connection;
//! use courier::http::router::{PrefixMatch, Router};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let router = Arc::new(Router::new(PrefixMatch::Raw));
//!     let listener = TcpListener::bind("127.0.0.1:4221").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let router = Arc::clone(&router);
//!         tokio::spawn(async move {
//!             if let Err(e) = Connection::new(socket, router).run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod router;
pub mod writer;
