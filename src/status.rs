//! Service status tool support
//!
//! Provides runtime status information about the Mealmetric service.

use serde::Serialize;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Estimation instructions for AI assistants
pub const ESTIMATE_INSTRUCTIONS: &str = r#"
# Mealmetric Estimation Instructions

This guide explains how to get a calorie/macro estimate for a food description.

## Overview

Call `estimate_food` with:
1. **description** - Free text, quantity words included ("2 eggs", "1lb chicken", "5g butter")
2. **grams** (optional) - The serving weight, when the user declared one

The response is a single reconciled estimate:
- `calories` - integer kilocalories for the whole described serving
- `protein_g` / `carbs_g` / `fat_g` - grams, one decimal
- `confidence_range` - honest qualifier, e.g. "±10%" or "±25%"
- `source` - which data source won

## What happens internally

Multiple nutrition sources are queried concurrently and reconciled:
sanity bounds, unit-confusion correction, and category rules are applied
before you see a number. Do NOT second-guess the returned value or apply
your own corrections; present it with its confidence range.

## When the tool errors

An error means every data source failed, including the fallback. Tell the
user the estimate is temporarily unavailable and suggest retrying; do not
invent a number.
"#;

/// Service status snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Which nutrition sources are configured and reachable
    pub configured_sources: Vec<&'static str>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Get the current status
    pub fn get_status(&self, configured_sources: Vec<&'static str>) -> ServiceStatus {
        let build_info = BuildInfo::current();

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ServiceStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            configured_sources,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_snapshot() {
        let tracker = StatusTracker::new();
        let status = tracker.get_status(vec!["model_fallback"]);
        assert_eq!(status.configured_sources, vec!["model_fallback"]);
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
    }
}
