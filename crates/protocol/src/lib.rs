//! Wire types for the Podium HTTP API

pub mod api;
