//! # Kotoba Common Library
//!
//! Shared code for the Kotoba language-learning tools:
//! - Domain models (courses, lessons, activities, progress, audio state)
//! - SQLite store with reactive reads
//! - Repositories over the store
//! - Content pack import
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod mapper;
pub mod models;
pub mod repository;

pub use error::{Error, Result};
