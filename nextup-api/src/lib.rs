//! # NextUp API Server library
//!
//! Library crate for the NextUp Hoops API server, exposing the router
//! builder and configuration so integration tests can assemble the full
//! application without binding a socket.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
