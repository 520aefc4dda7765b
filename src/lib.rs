//! # Atlas Search CLI
//!
//! Turns command-line parameters into MongoDB Atlas Search aggregation
//! pipelines, runs them, and prints the results as pretty JSON.
//!
//! Connection and search settings can be saved once as named configurations
//! and layered with per-invocation flags. Lexical search builds a `$search`
//! stage (optionally from a user-supplied template); vector search builds a
//! `$vectorSearch` stage from a literal vector or a Voyage AI embedding.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────┐   ┌──────────────┐   ┌──────────┐
//! │ ConfigStore  │──▶│  merge  │──▶│   pipeline   │──▶│    db    │
//! │ ~/.atlas-... │   │ + flags │   │ $search/$vec │   │ MongoDB  │
//! └──────────────┘   └─────────┘   └──────▲───────┘   └──────────┘
//!                                         │
//!                                  ┌──────┴──────┐
//!                                  │  embedding  │
//!                                  │  Voyage AI  │
//!                                  └─────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Home directory and optional TOML settings |
//! | [`config_cmd`] | `config set` / `list` / `get` |
//! | [`db`] | Connection, aggregation, result conversion |
//! | [`embedding`] | Voyage AI embeddings client |
//! | [`error`] | Error taxonomy and exit codes |
//! | [`merge`] | Flag overrides over saved configurations |
//! | [`models`] | Named configuration record |
//! | [`pipeline`] | Pipeline construction and template injection |
//! | [`search`] | `lexical` and `vector` commands |
//! | [`store`] | Configuration storage trait and backends |

pub mod config;
pub mod config_cmd;
pub mod db;
pub mod embedding;
pub mod error;
pub mod merge;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod store;
