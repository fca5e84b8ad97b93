//! HTTP request handlers.
//!
//! This module contains all the endpoint handlers for the gateway.

pub mod health;
pub mod proxy;
pub mod root;
