//! assetlog-lib: reconstructing asset lifecycle history from a git
//! inventory tree.
//!
//! The inventory's current state lives as a directory tree in a git
//! repository; every commit is a snapshot of the whole population.
//! This crate replays that history into a typed event log:
//!
//! - `registry`: one tree snapshot → typed [`registry::AssetRegistry`]
//! - `diff`: two registries → added/removed/changed identifier sets
//! - `lifecycle`: diff + cumulative live/disposed state → typed events,
//!   ordered by physical containment
//! - `changeset`: the ordered event record for one revision and its
//!   append-only on-disk log
//! - `history`: git revision enumeration and tree materialization
//! - `extract`: the strictly sequential end-to-end pipeline
//! - `export`: allowlist/alias metadata mapping for the dump
//!   representation

pub mod changeset;
pub mod consts;
pub mod diff;
pub mod export;
pub mod extract;
pub mod history;
pub mod lifecycle;
pub mod registry;
