//! Marketplace Core - Shared types and client-side state.
//!
//! This crate provides the pieces shared by every marketplace component:
//! - `gateway` - Request proxy and JSON API in front of the managed backend
//! - `cli` - Command-line tools for route checks, carts and backend calls
//!
//! # Architecture
//!
//! The core crate has no network I/O. Persistence is abstracted behind the
//! [`cart::CartStorage`] trait so the gateway, the CLI and tests can each plug
//! in their own storage.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, roles, session snapshots and `Loadable`
//! - [`cart`] - Cart store with derived totals, persistence and sync events
//! - [`routes`] - Route classification and the proxy decision function
//! - [`guard`] - Auth guard state machine for role-gated views

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod guard;
pub mod routes;
pub mod types;

pub use types::*;
