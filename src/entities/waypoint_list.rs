use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Coordinates, Role, Stop, Waypoint};
use crate::error::{invalid_order_error, not_found_error, rejected_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListState {
    Empty,
    StartOnly,
    Routable,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaypointListing {
    pub state: ListState,
    pub stops: Vec<Stop>,
}

/// Ordered route waypoints. Index 0 is the start and, once there are two or
/// more entries, the last index is the end. Everything in between can be
/// reordered; start and end are pinned.
#[derive(Clone, Debug, Default)]
pub struct WaypointList {
    entries: Vec<Waypoint>,
}

impl WaypointList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self) -> ListState {
        match self.entries.len() {
            0 => ListState::Empty,
            1 => ListState::StartOnly,
            _ => ListState::Routable,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Waypoint> {
        self.entries.iter().find(|w| w.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.entries
    }

    pub fn stops(&self) -> Vec<Stop> {
        let len = self.entries.len();

        self.entries
            .iter()
            .enumerate()
            .map(|(index, waypoint)| Stop {
                index,
                role: Role::at(index, len),
                waypoint: waypoint.clone(),
            })
            .collect()
    }

    pub fn listing(&self) -> WaypointListing {
        WaypointListing {
            state: self.state(),
            stops: self.stops(),
        }
    }

    pub fn start(&self) -> Option<&Waypoint> {
        self.entries.first()
    }

    pub fn end(&self) -> Option<&Waypoint> {
        match self.state() {
            ListState::Routable => self.entries.last(),
            _ => None,
        }
    }

    pub fn intermediates(&self) -> &[Waypoint] {
        match self.state() {
            ListState::Routable => &self.entries[1..self.entries.len() - 1],
            _ => &[],
        }
    }

    pub fn positions(&self) -> Vec<Coordinates> {
        self.entries.iter().map(|w| w.position).collect()
    }

    fn is_pinned(&self, index: usize) -> bool {
        Role::at(index, self.entries.len()).is_pinned()
    }

    /// Adds a waypoint. Once an end exists, new entries go just before it.
    #[tracing::instrument(skip(self))]
    pub fn insert(&mut self, label: String, position: Coordinates) -> Waypoint {
        let waypoint = Waypoint::new(label, position);

        match self.entries.len() {
            0 | 1 => self.entries.push(waypoint.clone()),
            n => self.entries.insert(n - 1, waypoint.clone()),
        }

        waypoint
    }

    #[tracing::instrument(skip(self))]
    pub fn update(
        &mut self,
        id: Uuid,
        label: String,
        position: Coordinates,
    ) -> Result<Waypoint, Error> {
        let waypoint = self
            .entries
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| not_found_error())?;

        waypoint.label = label;
        waypoint.position = position;

        Ok(waypoint.clone())
    }

    #[tracing::instrument(skip(self))]
    pub fn remove(&mut self, id: Uuid) -> Result<Waypoint, Error> {
        let index = self
            .entries
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| not_found_error())?;

        Ok(self.entries.remove(index))
    }

    /// Moves the intermediate at `from` to `to`. Both indices must refer to
    /// intermediates, so lists shorter than three entries reject every move.
    #[tracing::instrument(skip(self))]
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), Error> {
        let len = self.entries.len();

        if from >= len || to >= len || self.is_pinned(from) || self.is_pinned(to) {
            return Err(rejected_error());
        }

        let waypoint = self.entries.remove(from);
        self.entries.insert(to, waypoint);

        Ok(())
    }

    /// Rebuilds the list as `[start, ids..., end]`. `ids` must be a
    /// permutation of the current intermediate ids; anything else leaves the
    /// list untouched.
    #[tracing::instrument(skip(self))]
    pub fn apply_optimized_order(&mut self, ids: &[Uuid]) -> Result<(), Error> {
        if self.state() != ListState::Routable {
            return Err(invalid_order_error());
        }

        let current: HashSet<Uuid> = self.intermediates().iter().map(|w| w.id).collect();
        let mut seen = HashSet::with_capacity(ids.len());

        if ids.len() != current.len() {
            tracing::warn!(
                "expected {} intermediate ids, got {}",
                current.len(),
                ids.len()
            );
            return Err(invalid_order_error());
        }

        for id in ids {
            if !current.contains(id) || !seen.insert(*id) {
                tracing::warn!("foreign or duplicated id in optimized order: {}", id);
                return Err(invalid_order_error());
            }
        }

        let len = self.entries.len();
        let end = self.entries.remove(len - 1);
        let mut middle: HashMap<Uuid, Waypoint> =
            self.entries.drain(1..).map(|w| (w.id, w)).collect();

        for id in ids {
            if let Some(waypoint) = middle.remove(id) {
                self.entries.push(waypoint);
            }
        }
        self.entries.push(end);

        Ok(())
    }
}

// Inserts the start, then the end, then the stops, so the list reads in
// the order given.
#[cfg(test)]
fn list_of(labels: &[&str]) -> WaypointList {
    let mut order: Vec<usize> = (0..labels.len()).collect();
    if order.len() > 2 {
        if let Some(end) = order.pop() {
            order.insert(1, end);
        }
    }

    let mut list = WaypointList::new();
    for i in order {
        list.insert(labels[i].to_string(), Coordinates::new(i as f64, i as f64));
    }
    list
}

#[cfg(test)]
fn labels(list: &WaypointList) -> Vec<String> {
    list.waypoints().iter().map(|w| w.label.clone()).collect()
}

#[cfg(test)]
fn ids(list: &WaypointList) -> Vec<Uuid> {
    list.waypoints().iter().map(|w| w.id).collect()
}

#[test]
fn list_fixture_reads_in_given_order() {
    let cases: [&[&str]; 4] = [&["a"], &["a", "b"], &["a", "b", "c"], &["a", "b", "c", "d", "e"]];

    for names in cases {
        let list = list_of(names);

        assert_eq!(labels(&list), names);
        for (i, waypoint) in list.waypoints().iter().enumerate() {
            assert_eq!(waypoint.position, Coordinates::new(i as f64, i as f64));
        }
    }
}

#[test]
fn insert_keeps_start_and_end() {
    let mut list = WaypointList::new();
    assert_eq!(list.state(), ListState::Empty);
    assert!(list.end().is_none());

    let a = list.insert("a".into(), Coordinates::new(0.0, 0.0));
    assert_eq!(list.state(), ListState::StartOnly);
    assert!(list.end().is_none());

    let d = list.insert("d".into(), Coordinates::new(1.0, 1.0));
    assert_eq!(list.state(), ListState::Routable);

    for label in ["b", "c", "e"] {
        list.insert(label.into(), Coordinates::new(2.0, 2.0));

        let stops = list.stops();
        assert_eq!(stops.first().unwrap().waypoint.id, a.id);
        assert_eq!(stops.last().unwrap().waypoint.id, d.id);
        assert_eq!(stops.iter().filter(|s| s.role == Role::Start).count(), 1);
        assert_eq!(stops.iter().filter(|s| s.role == Role::End).count(), 1);
    }

    assert_eq!(labels(&list), vec!["a", "b", "c", "e", "d"]);
}

#[test]
fn insert_with_two_entries_lands_in_the_middle() {
    let mut list = list_of(&["a", "d"]);
    let b = list.insert("b".into(), Coordinates::new(5.0, 5.0));

    assert_eq!(list.waypoints()[1].id, b.id);
    assert_eq!(labels(&list), vec!["a", "b", "d"]);
}

#[test]
fn update_replaces_in_place() {
    let mut list = list_of(&["a", "b", "c"]);
    let before = ids(&list);
    let id = before[1];

    let updated = list
        .update(id, "B".into(), Coordinates::new(9.0, 9.0))
        .unwrap();

    assert_eq!(updated.id, id);
    assert_eq!(ids(&list), before);
    assert_eq!(labels(&list), vec!["a", "B", "c"]);
    assert_eq!(list.get(id).unwrap().position, Coordinates::new(9.0, 9.0));
}

#[test]
fn update_is_idempotent() {
    let mut list = list_of(&["a", "b", "c"]);
    let id = ids(&list)[1];

    list.update(id, "B".into(), Coordinates::new(9.0, 9.0))
        .unwrap();
    let once = list.waypoints().to_vec();

    list.update(id, "B".into(), Coordinates::new(9.0, 9.0))
        .unwrap();
    assert_eq!(list.waypoints(), once.as_slice());
}

#[test]
fn update_missing_id() {
    let mut list = list_of(&["a", "b"]);
    let before = list.waypoints().to_vec();

    let err = list
        .update(Uuid::new_v4(), "x".into(), Coordinates::new(0.0, 0.0))
        .unwrap_err();

    assert!(err.is(crate::error::ErrorKind::NotFound));
    assert_eq!(list.waypoints(), before.as_slice());
}

#[test]
fn remove_twice() {
    let mut list = list_of(&["a", "b", "c"]);
    let id = ids(&list)[1];

    assert!(list.remove(id).is_ok());
    let err = list.remove(id).unwrap_err();

    assert!(err.is(crate::error::ErrorKind::NotFound));
    assert_eq!(labels(&list), vec!["a", "c"]);
}

#[test]
fn remove_end_promotes_previous_entry() {
    let mut list = list_of(&["a", "b", "c"]);
    let end = ids(&list)[2];

    list.remove(end).unwrap();

    assert_eq!(list.end().unwrap().label, "b");
}

#[test]
fn reorder_moves_intermediates() {
    let mut list = list_of(&["a", "b", "c", "d", "e"]);

    list.reorder(1, 3).unwrap();
    assert_eq!(labels(&list), vec!["a", "c", "d", "b", "e"]);

    list.reorder(3, 1).unwrap();
    assert_eq!(labels(&list), vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn reorder_rejects_pinned_indices() {
    let mut list = list_of(&["a", "b", "c", "d"]);
    let before = ids(&list);

    for (from, to) in [(0, 1), (1, 0), (3, 1), (1, 3), (0, 3), (2, 4), (7, 1)] {
        let err = list.reorder(from, to).unwrap_err();
        assert!(err.is(crate::error::ErrorKind::Rejected));
        assert_eq!(ids(&list), before);
    }
}

#[test]
fn reorder_short_lists_always_rejected() {
    for n in 0..3 {
        let names: Vec<&str> = ["a", "b", "c"][..n].to_vec();
        let mut list = list_of(&names);

        for from in 0..3 {
            for to in 0..3 {
                assert!(list.reorder(from, to).is_err());
            }
        }
    }
}

#[test]
fn apply_optimized_order_valid_permutation() {
    let mut list = list_of(&["a", "b", "c", "d", "e"]);
    let before = list.waypoints().to_vec();
    let [a, b, c, d, e] = [
        before[0].id,
        before[1].id,
        before[2].id,
        before[3].id,
        before[4].id,
    ];

    list.apply_optimized_order(&[d, b, c]).unwrap();

    assert_eq!(ids(&list), vec![a, d, b, c, e]);
    for waypoint in list.waypoints() {
        let original = before.iter().find(|w| w.id == waypoint.id).unwrap();
        assert_eq!(waypoint, original);
    }
}

#[test]
fn apply_optimized_order_rejects_bad_permutations() {
    let mut list = list_of(&["a", "b", "c", "d"]);
    let before = ids(&list);
    let (b, c) = (before[1], before[2]);

    let bad: Vec<Vec<Uuid>> = vec![
        vec![b],
        vec![b, b],
        vec![b, Uuid::new_v4()],
        vec![b, c, before[0]],
        vec![before[0], before[3]],
    ];

    for order in bad {
        let err = list.apply_optimized_order(&order).unwrap_err();
        assert!(err.is(crate::error::ErrorKind::Rejected));
        assert_eq!(err.message, invalid_order_error().message);
        assert_eq!(ids(&list), before);
    }
}

#[test]
fn apply_optimized_order_short_lists() {
    let mut list = list_of(&["a"]);
    assert!(list.apply_optimized_order(&[]).is_err());

    let mut list = list_of(&["a", "b"]);
    let before = ids(&list);
    list.apply_optimized_order(&[]).unwrap();
    assert_eq!(ids(&list), before);
}
