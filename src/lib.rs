//! # Plant Collector
//!
//! Receives sensor readings over HTTP, appends them to one JSON-lines file per
//! day and answers queries about the most recent readings.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod stats;
pub mod storage;
pub mod window;
