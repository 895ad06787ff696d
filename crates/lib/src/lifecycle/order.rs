//! Emission ordering for a revision's events.
//!
//! Assets can be physically located inside other assets, and a single
//! revision can both create a container and move something into it. The
//! orderer builds the containment graph of the current registry and
//! emits a container's events before the events of anything located
//! inside it, so replaying the log never references a container before
//! its own event has been seen.

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use crate::changeset::Event;
use crate::registry::{AssetRegistry, Entry};

/// Errors from emission ordering.
#[derive(Debug, Error)]
pub enum OrderError {
  /// An asset is nested, possibly indirectly, inside itself. The
  /// snapshot cannot be ordered and the run is aborted.
  #[error("containment cycle involving asset '{code}'")]
  CycleDetected { code: String },
}

/// Order one revision's events by containment.
///
/// An edge `code -> location_ref` exists only when the referenced entry
/// is itself an asset in `current`; location references do not
/// constrain ordering. The events of identifiers absent from `current`
/// (disposals) follow the ordered portion, sorted by code.
pub fn order_events(
  current: &AssetRegistry,
  events: Vec<Event>,
) -> Result<Vec<Event>, OrderError> {
  let mut pending: BTreeMap<String, Event> = events
    .into_iter()
    .map(|event| (event.asset_code().to_string(), event))
    .collect();

  let mut graph: DiGraph<&str, ()> = DiGraph::new();
  let mut nodes: BTreeMap<&str, NodeIndex> = BTreeMap::new();

  for id in current.entries.keys() {
    let index = graph.add_node(id.as_str());
    nodes.insert(id.as_str(), index);
  }
  for (id, entry) in &current.entries {
    if let Entry::Asset(asset) = entry
      && matches!(current.get(&asset.location_ref), Some(Entry::Asset(_)))
    {
      graph.add_edge(nodes[id.as_str()], nodes[asset.location_ref.as_str()], ());
    }
  }

  let sorted = toposort(&graph, None).map_err(|cycle| OrderError::CycleDetected {
    code: graph[cycle.node_id()].to_string(),
  })?;

  let mut ordered = Vec::with_capacity(pending.len());
  for index in sorted.into_iter().rev() {
    if let Some(event) = pending.remove(graph[index]) {
      ordered.push(event);
    }
  }
  // Disposed identifiers are no longer registry nodes.
  ordered.extend(pending.into_values());

  Ok(ordered)
}
