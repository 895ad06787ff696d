//! End-to-end pipeline walkthrough over on-disk snapshots.
//!
//! Each step writes a full snapshot tree to disk, builds its registry,
//! diffs it against the previous one, classifies, and orders: the same
//! sequence the extraction pipeline runs per revision, minus git.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use assetlog_lib::changeset::{AssetRecord, ChangeSet, Event};
use assetlog_lib::diff::compute_diff;
use assetlog_lib::lifecycle::{LifecycleState, OrderError, classify, order_events};
use assetlog_lib::registry::{Asset, AssetData, AssetRegistry, Entry, build};
use tempfile::TempDir;

/// Materialize a snapshot from `(relative path, content)` pairs and
/// build its registry.
fn snapshot(files: &[(&str, &str)]) -> AssetRegistry {
  let temp = TempDir::new().unwrap();
  for (rel, content) in files {
    let path = temp.path().join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
  }
  build(temp.path()).unwrap()
}

/// One pipeline step: diff, classify, order.
fn step(
  previous: &AssetRegistry,
  current: &AssetRegistry,
  state: &LifecycleState,
) -> (Vec<Event>, LifecycleState) {
  let diff = compute_diff(previous, current);
  let (events, next) = classify(&diff, previous, current, state).unwrap();
  let ordered = order_events(current, events).unwrap();
  (ordered, next)
}

fn position(events: &[Event], code: &str) -> usize {
  events
    .iter()
    .position(|e| e.asset_code() == code)
    .unwrap_or_else(|| panic!("no event for {}", code))
}

#[test]
fn scenario_create() {
  let previous = AssetRegistry::default();
  let current = snapshot(&[("bay/1/widget-sr100", "condition: good\n")]);

  let (events, state) = step(&previous, &current, &LifecycleState::default());

  assert_eq!(events.len(), 1);
  match &events[0] {
    Event::Add { asset } => {
      assert_eq!(asset.asset_code, "sr100");
      assert_eq!(asset.asset_type, "widget");
      assert_eq!(asset.location, "bay/1");
    }
    other => panic!("expected add, got {:?}", other),
  }
  assert!(state.is_live("sr100"));
}

#[test]
fn scenario_dispose_then_restore() {
  let populated = snapshot(&[("bay/1/widget-sr100", "condition: good\n")]);
  let empty = AssetRegistry::default();

  let (_, state) = step(&empty, &populated, &LifecycleState::default());

  // Revision 2: the asset disappears.
  let (events, state) = step(&populated, &empty, &state);
  assert_eq!(events.len(), 1);
  assert!(matches!(&events[0], Event::Dispose { asset_code } if asset_code == "sr100"));
  assert!(state.is_disposed("sr100"));

  // Revision 3: the same code reappears unchanged.
  let (events, state) = step(&empty, &populated, &state);
  assert_eq!(events.len(), 1);
  assert!(matches!(&events[0], Event::Restore { asset } if asset.asset_code == "sr100"));
  assert!(state.is_live("sr100"));
  assert!(!state.is_disposed("sr100"));
}

#[test]
fn scenario_move_vs_change() {
  let rev3 = snapshot(&[
    ("bay/1/widget-sr100", "condition: good\n"),
    ("bay/2/marker-sr999", "condition: good\n"),
  ]);
  let (_, state) = step(&AssetRegistry::default(), &rev3, &LifecycleState::default());

  // Revision 4: sr100 moves from bay/1 to bay/2, data untouched.
  let rev4 = snapshot(&[
    ("bay/2/widget-sr100", "condition: good\n"),
    ("bay/2/marker-sr999", "condition: good\n"),
  ]);
  let (events, state) = step(&rev3, &rev4, &state);
  let moves: Vec<&Event> = events
    .iter()
    .filter(|e| matches!(e, Event::Move { .. }))
    .collect();
  assert_eq!(moves.len(), 1);
  match moves[0] {
    Event::Move {
      asset_code,
      old_location,
      new_location,
    } => {
      assert_eq!(asset_code, "sr100");
      assert_eq!(old_location, "bay/1");
      assert_eq!(new_location, "bay/2");
    }
    _ => unreachable!(),
  }

  // Revision 5: condition flips, location untouched.
  let rev5 = snapshot(&[
    ("bay/2/widget-sr100", "condition: faulty\n"),
    ("bay/2/marker-sr999", "condition: good\n"),
  ]);
  let (events, _) = step(&rev4, &rev5, &state);
  assert_eq!(events.len(), 1);
  match &events[0] {
    Event::Change { asset_code, old, new } => {
      assert_eq!(asset_code, "sr100");
      assert_eq!(old.data.get("condition").unwrap().as_str().unwrap(), "good");
      assert_eq!(new.data.get("condition").unwrap().as_str().unwrap(), "faulty");
    }
    other => panic!("expected change, got {:?}", other),
  }
}

#[test]
fn scenario_nested_dependency_ordering() {
  let rev5 = snapshot(&[
    ("bay/1/marker-sr999", "condition: good\n"),
    ("bay/2/widget-sr100", "condition: good\n"),
  ]);
  let (_, state) = step(&AssetRegistry::default(), &rev5, &LifecycleState::default());

  // Revision 6: a container appears in bay/2 and sr100 moves into it
  // in the same revision.
  let rev6 = snapshot(&[
    ("bay/1/marker-sr999", "condition: good\n"),
    ("bay/2/rack-sr200/info", "description: rack\n"),
    ("bay/2/rack-sr200/widget-sr100", "condition: good\n"),
  ]);
  let (events, _) = step(&rev5, &rev6, &state);

  assert!(matches!(
    events[position(&events, "sr200")],
    Event::Add { .. }
  ));
  match &events[position(&events, "sr100")] {
    Event::Move {
      old_location,
      new_location,
      ..
    } => {
      assert_eq!(old_location, "bay/2");
      assert_eq!(new_location, "sr200");
    }
    other => panic!("expected move, got {:?}", other),
  }
  assert!(position(&events, "sr200") < position(&events, "sr100"));
}

#[test]
fn scenario_containment_cycle_is_fatal() {
  let mut registry = AssetRegistry::default();
  for (code, location) in [("sr300", "sr301"), ("sr301", "sr300")] {
    registry.entries.insert(
      code.to_string(),
      Entry::Asset(Asset {
        code: code.to_string(),
        asset_type: "widget".to_string(),
        location_ref: location.to_string(),
        data: AssetData::new(),
      }),
    );
  }

  let events = vec![Event::Dispose {
    asset_code: "sr999".to_string(),
  }];
  let result = order_events(&registry, events);
  assert!(matches!(result, Err(OrderError::CycleDetected { .. })));
}

#[test]
fn diff_sets_stay_disjoint_and_state_partitions() {
  let rev1 = snapshot(&[
    ("bay/1/widget-sr100", "condition: good\n"),
    ("bay/2/widget-sr101", "condition: good\n"),
  ]);
  let rev2 = snapshot(&[
    ("bay/1/widget-sr100", "condition: faulty\n"),
    ("bay/2/widget-sr102", "condition: good\n"),
  ]);

  let diff = compute_diff(&rev1, &rev2);
  assert!(diff.added.intersection(&diff.removed).next().is_none());
  assert!(diff.added.intersection(&diff.changed).next().is_none());
  assert!(diff.removed.intersection(&diff.changed).next().is_none());

  let (_, state) = step(&AssetRegistry::default(), &rev1, &LifecycleState::default());
  let (_, state) = step(&rev1, &rev2, &state);

  for code in ["sr100", "sr101", "sr102"] {
    assert!(state.has_seen(code));
    assert!(state.is_live(code) ^ state.is_disposed(code));
  }
}

#[test]
fn self_diff_produces_nothing() {
  let registry = snapshot(&[("bay/1/widget-sr100", "condition: good\n")]);
  let diff = compute_diff(&registry, &registry);
  assert!(diff.is_empty());
}

/// Replay a changeset log from an empty inventory.
fn replay(changesets: &[ChangeSet]) -> BTreeMap<String, AssetRecord> {
  let mut inventory: BTreeMap<String, AssetRecord> = BTreeMap::new();
  for changeset in changesets {
    for event in &changeset.events {
      match event {
        Event::Add { asset } | Event::Restore { asset } => {
          inventory.insert(asset.asset_code.clone(), asset.clone());
        }
        Event::Dispose { asset_code } => {
          inventory.remove(asset_code);
        }
        Event::Move {
          asset_code,
          new_location,
          ..
        } => {
          inventory.get_mut(asset_code).unwrap().location = new_location.clone();
        }
        Event::Change { new, .. } => {
          inventory.insert(new.asset_code.clone(), new.clone());
        }
      }
    }
  }
  inventory
}

#[test]
fn replaying_the_log_reproduces_the_final_registry() {
  let revisions = [
    snapshot(&[("bay/1/widget-sr100", "condition: good\n")]),
    snapshot(&[
      ("bay/1/widget-sr100", "condition: good\n"),
      ("bay/2/psu-sr101", "condition: good\n"),
    ]),
    snapshot(&[("bay/2/psu-sr101", "condition: good\n")]),
    snapshot(&[
      ("bay/2/psu-sr101", "condition: worn\n"),
      ("bay/1/widget-sr100", "condition: good\n"),
    ]),
    snapshot(&[
      ("bay/2/rack-sr200/info", "description: rack\n"),
      ("bay/2/rack-sr200/psu-sr101", "condition: worn\n"),
      ("bay/1/widget-sr100", "condition: good\n"),
    ]),
  ];

  let mut changesets = Vec::new();
  let mut state = LifecycleState::default();
  let mut previous = AssetRegistry::default();
  let timestamp = "2021-06-01T12:00:00Z".parse().unwrap();

  for (index, current) in revisions.iter().enumerate() {
    let (events, next) = step(&previous, current, &state);
    if !events.is_empty() {
      changesets.push(
        ChangeSet::new(
          timestamp,
          "a@example.org".to_string(),
          format!("rev{}", index + 1),
          events,
        )
        .unwrap(),
      );
    }
    state = next;
    previous = current.clone();
  }

  let replayed = replay(&changesets);
  let expected: BTreeMap<String, AssetRecord> = previous
    .assets()
    .map(|asset| (asset.code.clone(), AssetRecord::from(asset)))
    .collect();

  assert_eq!(replayed, expected);
}
