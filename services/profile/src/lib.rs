//! Profile service
//!
//! Stores users, their photos and tags, serves them over HTTP and announces
//! profile changes on three message queues (ankets, tags, photos).

pub mod config;
pub mod error;
pub mod messaging;
pub mod middleware;
pub mod models;
pub mod object_store;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod state;
pub mod validation;
