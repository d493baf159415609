//! An async HTTP client for the PysonDB-KV remote key-value service
//!
//! This library wraps the service's six CRUD endpoints as method calls.
//! Every request carries a static `AUTH_KEY` header; the server owns all
//! storage, key assignment and schema decisions, and the client passes
//! records through as opaque JSON.
//!
//! # Features
//! - One method per endpoint: get, get_all, add, update, delete, delete_all
//! - Static `AUTH_KEY` header authentication
//! - Async/await API using tokio
//! - JSON-or-text response normalization via [`Payload`]
//! - Structured errors carrying the HTTP status and raw body
//! - Built-in timeout support
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pysondb_kv_client::Client;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pysondb_kv_client::Error> {
//!     let client = Client::new("https://meow.workers.dev", "your-auth-key")?;
//!
//!     // Store an item; the server assigns the key
//!     let added = client.add(&json!({"name": "Alice", "age": 25})).await?;
//!     let key = added.key().expect("add response carries a key").to_string();
//!
//!     // Retrieve it
//!     let item = client.get(&key).await?;
//!     println!("Retrieved: {:?}", item.as_json());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod client;
pub mod error;
pub mod types;

pub use client::{Client, ClientConfig};
pub use error::{Error, Result};
pub use types::{Payload, Record};
