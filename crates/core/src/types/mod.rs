//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod order;
pub mod product;
pub mod stats;
pub mod user;

pub use cart::{CartLine, cart_total};
pub use id::*;
pub use order::{Order, OrderStatus, ShippingAddress};
pub use product::{Category, CategoryRef, ImageSource, MerchantProduct, Product};
pub use stats::DashboardStats;
pub use user::{SignupRequest, User};
