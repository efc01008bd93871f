// crates/shield-core/src/runtime/facts.rs
// ============================================================================
// Module: Cluster Facts
// Description: Clock and cluster-state implementations.
// Purpose: Supply the date and node count consulted by license evaluation.
// Dependencies: crate::interfaces, time
// ============================================================================

//! ## Overview
//! [`SystemClock`] reads the UTC calendar date; [`FixedClock`] pins it for
//! tests. [`StaticClusterState`] reports facts loaded from configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Date;
use time::OffsetDateTime;

use crate::interfaces::Clock;
use crate::interfaces::ClusterState;

// ============================================================================
// SECTION: Clocks
// ============================================================================

/// Clock backed by the system time (UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

// ============================================================================
// SECTION: Cluster State
// ============================================================================

/// Cluster facts fixed at process start.
#[derive(Debug, Clone, Copy)]
pub struct StaticClusterState {
    /// Node count.
    node_count: u32,
    /// Cluster creation day.
    created_on: Date,
}

impl StaticClusterState {
    /// Creates static cluster facts.
    #[must_use]
    pub const fn new(node_count: u32, created_on: Date) -> Self {
        Self {
            node_count,
            created_on,
        }
    }
}

impl ClusterState for StaticClusterState {
    fn node_count(&self) -> u32 {
        self.node_count
    }

    fn created_on(&self) -> Date {
        self.created_on
    }
}
