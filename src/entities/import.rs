use serde::{Deserialize, Serialize};

use crate::entities::{Coordinates, Waypoint};

/// One entry of a bulk import. Records without a position are geocoded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportRecord {
    pub label: String,
    #[serde(default)]
    pub position: Option<Coordinates>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportFailure {
    pub label: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub inserted: Vec<Waypoint>,
    pub failed: Vec<ImportFailure>,
}

#[test]
fn import_record_position_is_optional() {
    let records: Vec<ImportRecord> = serde_json::from_str(
        r#"[{"label": "Plaza de Mayo"}, {"label": "here", "position": {"lat": 1.5, "lng": 2.5}}]"#,
    )
    .unwrap();

    assert!(records[0].position.is_none());
    assert_eq!(records[1].position, Some(Coordinates::new(1.5, 2.5)));
}
