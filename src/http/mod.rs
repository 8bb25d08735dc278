//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 side of the server: incremental
//! request parsing, the per-connection state machine, and response
//! serialization.
//!
//! # Architecture
//!
//! - **`connection`**: The main connection handler implementing the
//!   request-response state machine
//! - **`parser`**: Byte-incremental request parser; assembles a request from
//!   however many socket deliveries it takes
//! - **`request`**: HTTP request representation and semantic validation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Feed incoming bytes to the request parser
//!        └──────┬──────┘
//!               │ Request complete
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Validate, route, build response
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Drain response bytes (partial writes resumed)
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```
//!
//! A malformed request short-circuits Processing: a 400 response is queued
//! and the connection closes once it is flushed. Timeouts and peer
//! disconnects go straight to Closed. All of these are fatal only to the one
//! connection, never to the process.

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
