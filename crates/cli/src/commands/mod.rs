//! CLI command implementations.

pub mod call;
pub mod cart;
pub mod route;
