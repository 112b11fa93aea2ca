pub mod addresses;
pub mod routes;
pub mod waypoints;
