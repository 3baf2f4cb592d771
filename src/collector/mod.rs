//! Host metrics collector for Linux.
//!
//! This module reads the `/proc` feeds, keeps the CPU baseline between
//! cycles and assembles one [`MetricsSnapshot`](crate::model::MetricsSnapshot)
//! per cycle. All reads go through the [`FileSystem`] trait so the whole
//! pipeline can run against [`MockFs`] in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Collector                           │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │  CpuUsageCalculator │   │     SystemCollector         │  │
//! │  │  - previous sample  │   │  - /proc/meminfo            │  │
//! │  └─────────────────────┘   │  - /proc/stat               │  │
//! │  ┌─────────────────────┐   │  - /proc/diskstats          │  │
//! │  │ AllocatorStats      │   │  - /proc/net/dev            │  │
//! │  │ Provider (optional) │   └──────────────┬──────────────┘  │
//! │  └─────────────────────┘                  │                 │
//! │                                    ┌──────▼──────┐          │
//! │                                    │  FileSystem │ (trait)  │
//! │                                    └──────┬──────┘          │
//! └───────────────────────────────────────────┼─────────────────┘
//!                                             │
//!                             ┌───────────────┼───────────────┐
//!                             │               │               │
//!                      ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!                      │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!                      │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!                      └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use hostpulse::collector::{Collector, DeviceSelector, RealFs};
//!
//! let mut collector = Collector::new(RealFs::new(), "/proc", DeviceSelector::default());
//! let snapshot = collector.collect_snapshot();
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use hostpulse::collector::{Collector, DeviceSelector, MockFs};
//!
//! let fs = MockFs::typical_system();
//! let mut collector = Collector::new(fs, "/proc", DeviceSelector::default());
//! let snapshot = collector.collect_snapshot();
//! assert_eq!(snapshot.len(), hostpulse::model::keys::ALL.len());
//! ```

pub mod alloc;
#[allow(clippy::module_inception)]
mod collector;
pub mod cpu;
mod error;
pub mod mock;
pub mod procfs;
pub mod selector;
pub mod traits;

pub use alloc::{AllocatorStatsProvider, JemallocStats, MemStats, NoAllocatorStats};
pub use collector::{Collector, CollectorTiming, PERCENT_UNAVAILABLE};
pub use cpu::CpuUsageCalculator;
pub use error::SampleError;
pub use mock::MockFs;
pub use procfs::{ParseError, SystemCollector};
pub use selector::DeviceSelector;
pub use traits::{FileSystem, RealFs};
