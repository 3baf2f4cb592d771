//! hostpulse - host metrics sampler library.
//!
//! This library provides the pieces driven by the `hostpulsed` daemon:
//! - `collector` - reads `/proc` feeds and assembles snapshots
//! - `model` - raw samples and the ordered snapshot
//! - `publisher` - JSON encoding and the named pipe sink
//! - `config` - validated sampler configuration

pub mod collector;
pub mod config;
pub mod model;
pub mod publisher;
