//! Trivo Status Tool
//!
//! Runtime status of the assistant and the usage guide served to MCP
//! clients.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::config::AssistantConfig;

/// Usage guide for AI assistants
pub const ASSISTANT_INSTRUCTIONS: &str = r#"
# Trivo Recipe Assistant Instructions

Trivo compares nutrient profiles, proposes ingredient replacements and
nudges recipes toward healthier targets.

## Profiles

A nutrient profile is a flat object of nutrient name to amount, for example
`{"energia": 884, "grasas": 100}`. Missing nutrients count as 0. Use the same
units on both sides of a comparison.

## Matching

- `compare_profiles`: is the candidate within tolerance of the reference on
  every nutrient the reference lists? Reports the nutrients that differ.
- `find_replacements`: filter candidate ingredients down to those matching a
  target ingredient. Output keeps candidate order; there is no ranking.
- `catalog_replacements`: names in the ingredient catalog
  (`ingredientes_usda.json`) matched by a query profile.

The default tolerance is 5 units per nutrient.

## Recipes

A recipe has two maps: `ingredients` (name to quantity) and `nutrients`
(name to total). Keep them apart.

- `adjust_nutriscore`: `base` rules (sugar > 50 drops 20%, fiber < 5 gains 2)
  or `a_plus` rules (sugar > 30 drops 30%, fiber < 8 gains 3, calories > 300
  drop 10%). Rules act on nutrient totals only.
- `adjust_to_targets`: registered replacements overwrite ingredient
  quantities, then targets move each value to the target (negative targets
  clamp to 0).
- `adjust_for_water`: hard water (a hard-water region with calcium over
  50 mg/L) lowers water and salt 10%; otherwise water goes up 5%. Omit
  calcium to use the simulated reading for the source.
- `local_impact`: ingredient minus local profile, per local nutrient.

## Data

- `lookup_product`: Open Food Facts barcode lookup.
- `usda_lookup`: USDA search; `save=true` stores the profile in the catalog.
- `collect_data`: fetch listings from both sources into the data directory.
- `normalize_data`: min-max scale the collected records.
- `train_regressor` / `predict`: five-input nutrient regressor
  (energia, proteinas, grasas, carbohidratos, fibra).
"#;

/// A data file and whether it exists yet
#[derive(Debug, Clone, Serialize)]
pub struct DataFileStatus {
    pub path: String,
    pub size_bytes: Option<u64>,
}

/// Runtime status of the Trivo service
#[derive(Debug, Clone, Serialize)]
pub struct TrivoStatus {
    /// Build information
    pub version: &'static str,
    pub build_label: &'static str,
    pub build_timestamp: &'static str,

    /// Data directory and known files
    pub data_dir: String,
    pub data_files: Vec<DataFileStatus>,

    /// Configuration in effect
    pub similarity_tolerance: f64,
    pub hard_water_regions: Vec<String>,
    pub off_base_url: String,
    pub usda_base_url: String,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    config: AssistantConfig,
}

impl StatusTracker {
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            start_time: Instant::now(),
            config,
        }
    }

    pub fn get_status(&self) -> TrivoStatus {
        let build_info = BuildInfo::current();
        let paths = &self.config.paths;

        let data_files = [
            paths.off_data(),
            paths.usda_data(),
            paths.ingredient_catalog(),
            paths.model(),
        ]
        .iter()
        .map(|path: &PathBuf| DataFileStatus {
            path: path.display().to_string(),
            size_bytes: std::fs::metadata(path).ok().map(|m| m.len()),
        })
        .collect();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        TrivoStatus {
            version: build_info.version,
            build_label: build_info.build_label,
            build_timestamp: build_info.build_timestamp,
            data_dir: paths.data_dir.display().to_string(),
            data_files,
            similarity_tolerance: self.config.similarity_tolerance.value(),
            hard_water_regions: self.config.water.hard_water_regions.clone(),
            off_base_url: self.config.sources.off_base_url.clone(),
            usda_base_url: self.config.sources.usda_base_url.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
