//! Shopfront Core - Shared domain types.
//!
//! This crate provides the common types used across all Shopfront components:
//! - `client` - The client SDK (state container, request pipeline, storage)
//! - `cli` - Command-line front end over the client SDK
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage access. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Products, cart lines, orders, users, and dashboard stats

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
