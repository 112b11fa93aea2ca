use uuid::Uuid;

use crate::{
    entities::{Coordinates, WaypointList},
    error::{not_enough_points_error, reconciliation_mismatch_error, Error},
    external::{Job, OptimizationRequest},
};

/// Parses `"lat, lng"`. Anything that is not exactly two numbers is left to
/// the geocoder.
pub fn parse_coordinates(text: &str) -> Option<Coordinates> {
    let mut parts = text.split(',');

    let lat = parts.next()?.trim().parse::<f64>().ok()?;
    let lng = parts.next()?.trim().parse::<f64>().ok()?;

    if parts.next().is_some() {
        return None;
    }

    Some(Coordinates::new(lat, lng))
}

pub fn coordinates_label(coordinates: &Coordinates) -> String {
    format!("{}, {}", coordinates.lat, coordinates.lng)
}

/// Builds the optimization request for `list`. Job `i` is the intermediate at
/// list index `i + 1`; the returned ids map job indices back to waypoints.
pub fn build_optimization_request(
    list: &WaypointList,
) -> Result<(OptimizationRequest, Vec<Uuid>), Error> {
    if list.len() < 3 {
        return Err(not_enough_points_error());
    }

    let (start, end) = match (list.start(), list.end()) {
        (Some(start), Some(end)) => (start.position, end.position),
        _ => return Err(not_enough_points_error()),
    };

    let intermediates = list.intermediates();

    let jobs = intermediates
        .iter()
        .enumerate()
        .map(|(index, waypoint)| Job {
            index,
            position: waypoint.position,
        })
        .collect();

    let job_ids = intermediates.iter().map(|w| w.id).collect();

    Ok((OptimizationRequest { start, end, jobs }, job_ids))
}

pub fn job_order_to_ids(order: &[usize], job_ids: &[Uuid]) -> Result<Vec<Uuid>, Error> {
    order
        .iter()
        .map(|index| {
            job_ids
                .get(*index)
                .copied()
                .ok_or_else(|| reconciliation_mismatch_error())
        })
        .collect()
}

#[test]
fn parse_coordinate_pairs() {
    assert_eq!(
        parse_coordinates("-34.6,-58.4"),
        Some(Coordinates::new(-34.6, -58.4))
    );
    assert_eq!(
        parse_coordinates(" -34.6 , -58.4 "),
        Some(Coordinates::new(-34.6, -58.4))
    );
    assert_eq!(parse_coordinates("Av. Corrientes 1234, CABA"), None);
    assert_eq!(parse_coordinates("1, 2, 3"), None);
    assert_eq!(parse_coordinates("12.5"), None);
    assert_eq!(parse_coordinates(""), None);
}

#[test]
fn coordinate_label() {
    assert_eq!(
        coordinates_label(&Coordinates::new(-34.6, -58.4)),
        "-34.6, -58.4"
    );
}

#[test]
fn optimization_request_maps_intermediates() {
    let mut list = WaypointList::new();
    let a = list.insert("a".into(), Coordinates::new(0.0, 0.0));
    let d = list.insert("d".into(), Coordinates::new(3.0, 3.0));
    let b = list.insert("b".into(), Coordinates::new(1.0, 1.0));
    let c = list.insert("c".into(), Coordinates::new(2.0, 2.0));

    let (request, job_ids) = build_optimization_request(&list).unwrap();

    assert_eq!(request.start, a.position);
    assert_eq!(request.end, d.position);
    assert_eq!(request.jobs.len(), 2);
    assert_eq!(request.jobs[0].index, 0);
    assert_eq!(request.jobs[0].position, b.position);
    assert_eq!(request.jobs[1].position, c.position);
    assert_eq!(job_ids, vec![b.id, c.id]);

    assert_eq!(
        job_order_to_ids(&[1, 0], &job_ids).unwrap(),
        vec![c.id, b.id]
    );
    assert!(job_order_to_ids(&[2], &job_ids)
        .unwrap_err()
        .is(crate::error::ErrorKind::ReconciliationMismatch));
}

#[test]
fn optimization_request_needs_three_points() {
    let mut list = WaypointList::new();
    list.insert("a".into(), Coordinates::new(0.0, 0.0));
    list.insert("b".into(), Coordinates::new(1.0, 1.0));

    assert!(build_optimization_request(&list)
        .unwrap_err()
        .is(crate::error::ErrorKind::NotEnoughPoints));
}
