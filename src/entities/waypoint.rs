use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Coordinates;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: Uuid,
    pub label: String,
    pub position: Coordinates,
}

impl Waypoint {
    pub fn new(label: String, position: Coordinates) -> Self {
        Self {
            id: Uuid::new_v4(),
            label,
            position,
        }
    }
}

/// Role of a waypoint, a function of its index in the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Start,
    Intermediate,
    End,
}

impl Role {
    pub fn at(index: usize, len: usize) -> Self {
        if index == 0 || len < 2 {
            Role::Start
        } else if index == len - 1 {
            Role::End
        } else {
            Role::Intermediate
        }
    }

    pub fn is_pinned(&self) -> bool {
        match self {
            Role::Intermediate => false,
            _ => true,
        }
    }
}

/// A waypoint as read from the list, with its position and derived role.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub index: usize,
    pub role: Role,
    #[serde(flatten)]
    pub waypoint: Waypoint,
}

#[test]
fn role_is_positional() {
    assert_eq!(Role::at(0, 1), Role::Start);
    assert_eq!(Role::at(0, 2), Role::Start);
    assert_eq!(Role::at(1, 2), Role::End);
    assert_eq!(Role::at(1, 4), Role::Intermediate);
    assert_eq!(Role::at(2, 4), Role::Intermediate);
    assert_eq!(Role::at(3, 4), Role::End);
}

#[test]
fn waypoint_ids_are_unique() {
    let position = Coordinates::new(0.0, 0.0);
    let a = Waypoint::new("a".into(), position);
    let b = Waypoint::new("a".into(), position);

    assert_ne!(a.id, b.id);
}
