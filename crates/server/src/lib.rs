//! FarmLink server library.
//!
//! This crate provides the backend functionality as a library,
//! allowing it to be tested and reused (the CLI seeder goes through the
//! same hashing and repository code paths as the running server).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
