//! # Snipkeep Architecture
//!
//! Snipkeep keeps text snippets organised in a tree of folders. It is a
//! **UI-agnostic library**; the bundled command-line client is just one
//! consumer of it.
//!
//! ## The Three-Layer Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, prompts, prints status messages        │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns the Library and the byte store                      │
//! │  - Runs a command, reconciles the selection, saves          │
//! │  - Turns every failure into a status message                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Pure operations on a Library value                       │
//! │  - Returns Result<CmdResult>, no I/O except export files    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/, persist.rs)                         │
//! │  - KeyValueStore trait: FileStore, MemoryStore              │
//! │  - JSON blob format and the lenient default merge           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data Model
//!
//! A [`model::Library`] holds folders and snippets in id-keyed maps. Folders
//! refer to their parent, children and snippets by id; there are no object
//! references, so the tree is an arena and cycles cannot leak.
//!
//! Exactly one folder is the root. It cannot be renamed, moved or deleted.
//! Deleting any other folder removes its whole subtree and every snippet in it.
//!
//! ## Selection
//!
//! The library also records the active folder and snippet. After every
//! mutation the API calls [`commands::select::reconcile`], which points a
//! stale folder selection back at the root and replaces a snippet selection
//! that no longer belongs to the active folder.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Operations on the library
//! - [`model`]: Core data types (`Folder`, `Snippet`, `Library`)
//! - [`persist`]: Serialized format, load and save
//! - [`store`]: Key-value byte storage and implementations
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod persist;
pub mod store;
