mod import;
mod location;
mod route;
mod waypoint;
mod waypoint_list;

pub use import::{ImportFailure, ImportRecord, ImportReport};
pub use location::{Coordinates, Location};
pub use route::{OptimizedRoute, RouteGeometry};
pub use waypoint::{Role, Stop, Waypoint};
pub use waypoint_list::{ListState, WaypointList, WaypointListing};
