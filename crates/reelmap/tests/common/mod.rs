//! Shared test utilities for reelmap integration tests.
//!
//! This module provides:
//! - `TestHarness` wiring a pipeline to an in-memory database with scripted
//!   fetcher and geocoder fakes
//! - Builders for fetched content, geocoder answers and places

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{ScriptedFetcher, ScriptedGeocoder, TestHarness};
