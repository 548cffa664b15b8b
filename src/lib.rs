//! Trivo Library
//!
//! Recipe nutrition assistant: nutrient profile matching, NutriScore and
//! target heuristics, water-hardness adjustment, nutrition data ingestion
//! and a small nutrient regressor.

pub mod build_info;
pub mod config;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod regressor;
pub mod sources;
pub mod store;
pub mod tools;
