//! Adapters around key backends, token crypto and logging

pub mod auth;
pub mod keys;
pub mod logging;
