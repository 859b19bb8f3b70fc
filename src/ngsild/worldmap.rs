use crate::ngsild::attribute::{Attribute, Property, classify};
use crate::ngsild::entity::{CONTEXT_KEY, Entity};
use crate::ngsild::format::{
    VALUES_SEPARATOR, build_display_string, extract_core, extract_metadata,
};
use crate::ngsild::frame::{Field, Frame};

pub const ID_FIELD: &str = "Id";
pub const ATTRIBUTE_FIELD: &str = "Attribute";
pub const METRIC_FIELD: &str = "Metric";
pub const LATITUDE_FIELD: &str = "Latitude";
pub const LONGITUDE_FIELD: &str = "Longitude";

/// Attribute name shown for entities placed without a requested metric.
pub const NO_METRIC_ATTRIBUTE: &str = "no metric";
pub const NO_METRIC_VALUE: &str = "0";

/// One committed map row.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRow {
    pub id: String,
    pub attribute: String,
    pub metric: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Display string for the metadata selector column.
    pub metadata: String,
}

/// Metric cell and metadata cell found for one entity.
#[derive(Debug, Clone, Default, PartialEq)]
struct MetricCell {
    metric: String,
    metadata: String,
}

fn single_metric(property: &Property<'_>, selector: &str) -> MetricCell {
    let core = extract_core(property);
    let metadata = extract_metadata(property, selector);
    MetricCell {
        metadata: if metadata.found {
            build_display_string(
                "",
                &core.value,
                &core.unit_code,
                &metadata.value,
                &metadata.unit_code,
                VALUES_SEPARATOR,
            )
        } else {
            String::new()
        },
        metric: core.value,
    }
}

fn multi_metric(occurrences: &[Property<'_>], selector: &str) -> MetricCell {
    let joined = occurrences.iter().fold(String::new(), |acc, property| {
        let core = extract_core(property);
        let metadata = extract_metadata(property, selector);
        build_display_string(
            &acc,
            &core.value,
            &core.unit_code,
            &metadata.value,
            &metadata.unit_code,
            VALUES_SEPARATOR,
        )
    });

    MetricCell {
        metric: joined.split(' ').next().unwrap_or_default().to_string(),
        metadata: joined,
    }
}

/// Decide the row an entity contributes to the map, if any.
///
/// An entity needs a location to be placed. When a metric was requested it
/// must also carry that metric; when none was requested it is placed with a
/// `no metric` placeholder.
fn entity_row(entity: &Entity, map_metric: &str, selector: &str) -> Option<MapRow> {
    let mut metric: Option<MetricCell> = None;
    let mut lat_lon: Option<(f64, f64)> = None;

    for (key, raw) in &entity.attributes {
        if key == CONTEXT_KEY {
            continue;
        }

        let is_metric = !map_metric.is_empty() && key == map_metric;
        match classify(key, raw) {
            Some(Attribute::Location(location)) => match location.lat_lon() {
                Some(found) => lat_lon = Some(found),
                None => log::warn!("Entity {} has a location without coordinates", entity.id()),
            },
            Some(Attribute::Single(property)) if is_metric => {
                metric = Some(single_metric(&property, selector));
            }
            Some(Attribute::Multi(occurrences)) if is_metric => {
                metric = Some(multi_metric(&occurrences, selector));
            }
            _ => {}
        }
    }

    let id = entity.id().to_string();
    match (metric, lat_lon) {
        (Some(cell), Some((latitude, longitude))) => Some(MapRow {
            id,
            attribute: map_metric.to_string(),
            metric: cell.metric,
            latitude,
            longitude,
            metadata: cell.metadata,
        }),
        (None, Some((latitude, longitude))) if map_metric.is_empty() => Some(MapRow {
            id,
            attribute: NO_METRIC_ATTRIBUTE.to_string(),
            metric: NO_METRIC_VALUE.to_string(),
            latitude,
            longitude,
            metadata: String::new(),
        }),
        (Some(_), None) => {
            log::debug!("Entity {} has {} but no location, skipping", id, map_metric);
            None
        }
        (None, Some(_)) => {
            log::debug!("Entity {} has no {}, skipping", id, map_metric);
            None
        }
        (None, None) => None,
    }
}

/// Rows of the map projection, one per placeable entity, in collection order.
pub fn world_map_rows(
    entities: &[Entity],
    map_metric: &str,
    metadata_selector: &str,
) -> Vec<MapRow> {
    entities
        .iter()
        .filter_map(|entity| entity_row(entity, map_metric, metadata_selector))
        .collect()
}

/// Flatten entities into the map projection.
///
/// Columns are `Id, Attribute, Metric, Latitude, Longitude[, selector]`.
pub fn transform_to_world_map(
    name: &str,
    entities: &[Entity],
    map_metric: &str,
    metadata_selector: &str,
) -> Frame {
    let rows = world_map_rows(entities, map_metric, metadata_selector);

    let mut ids = Vec::with_capacity(rows.len());
    let mut attributes = Vec::with_capacity(rows.len());
    let mut metrics = Vec::with_capacity(rows.len());
    let mut latitudes = Vec::with_capacity(rows.len());
    let mut longitudes = Vec::with_capacity(rows.len());
    let mut metadata = Vec::with_capacity(rows.len());

    for row in rows {
        ids.push(row.id);
        attributes.push(row.attribute);
        metrics.push(row.metric);
        latitudes.push(row.latitude);
        longitudes.push(row.longitude);
        metadata.push(row.metadata);
    }

    let mut frame = Frame::new(name);
    frame.push(Field::strings(ID_FIELD, ids));
    frame.push(Field::strings(ATTRIBUTE_FIELD, attributes));
    frame.push(Field::strings(METRIC_FIELD, metrics));
    frame.push(Field::floats(LATITUDE_FIELD, latitudes));
    frame.push(Field::floats(LONGITUDE_FIELD, longitudes));
    if !metadata_selector.is_empty() {
        frame.push(Field::strings(metadata_selector, metadata));
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngsild::entity::parse_entities;

    #[test]
    fn metric_with_location_produces_one_row() {
        let entities = parse_entities(
            br#"{"id": "e1", "temperature": {"value": 5}, "location": {"value": {"coordinates": [2.3, 48.8]}}}"#,
        );

        let rows = world_map_rows(&entities, "temperature", "");

        assert_eq!(
            rows,
            vec![MapRow {
                id: "e1".to_string(),
                attribute: "temperature".to_string(),
                metric: "5".to_string(),
                latitude: 48.8,
                longitude: 2.3,
                metadata: String::new(),
            }]
        );
    }

    #[test]
    fn metric_without_location_is_dropped() {
        let entities = parse_entities(br#"{"id": "e1", "temperature": {"value": 5}}"#);

        assert!(world_map_rows(&entities, "temperature", "depth").is_empty());
    }

    #[test]
    fn location_without_requested_metric_is_dropped() {
        let entities = parse_entities(
            br#"{"id": "e1", "humidity": {"value": 5}, "location": {"value": {"coordinates": [2.3, 48.8]}}}"#,
        );

        assert!(world_map_rows(&entities, "temperature", "").is_empty());
    }

    #[test]
    fn location_only_without_metric_gets_placeholder() {
        let entities = parse_entities(
            br#"{"id": "e1", "location": {"value": {"type": "Point", "coordinates": [2.3, 48.8]}}}"#,
        );

        let rows = world_map_rows(&entities, "", "");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "e1");
        assert_eq!(rows[0].attribute, NO_METRIC_ATTRIBUTE);
        assert_eq!(rows[0].metric, NO_METRIC_VALUE);
        assert_eq!((rows[0].latitude, rows[0].longitude), (48.8, 2.3));
    }

    #[test]
    fn undecodable_location_counts_as_missing() {
        let entities = parse_entities(
            br#"{"id": "e1", "temperature": {"value": 5}, "location": {"value": {"coordinates": []}}}"#,
        );

        assert!(world_map_rows(&entities, "temperature", "").is_empty());
        assert!(world_map_rows(&entities, "", "").is_empty());
    }

    #[test]
    fn single_metric_metadata_cell() {
        let entities = parse_entities(
            br#"[
                {"id": "a", "temperature": {"value": 10, "unitCode": "CEL", "depth": {"value": 20, "unitCode": "MTR"}},
                 "location": {"value": {"coordinates": [1.0, 2.0]}}},
                {"id": "b", "temperature": {"value": 11, "unitCode": "CEL"},
                 "location": {"value": {"coordinates": [3.0, 4.0]}}}
            ]"#,
        );

        let frame = transform_to_world_map("Hive", &entities, "temperature", "depth");

        assert!(frame.is_aligned());
        assert_eq!(
            frame.field_names(),
            vec![ID_FIELD, ATTRIBUTE_FIELD, METRIC_FIELD, LATITUDE_FIELD, LONGITUDE_FIELD, "depth"]
        );
        let metrics = frame.field(METRIC_FIELD).unwrap().values.as_strings().unwrap();
        assert_eq!(metrics, ["10", "11"]);
        let metadata = frame.field("depth").unwrap().values.as_strings().unwrap();
        assert_eq!(metadata, ["10 CEL (20 MTR)", ""]);
    }

    #[test]
    fn multi_metric_takes_first_token_and_keeps_full_string() {
        let entities = parse_entities(
            br#"{
                "id": "e1",
                "temperature": [
                    {"value": 10, "unitCode": "CEL", "depth": {"value": 20, "unitCode": "MTR"}},
                    {"value": 12, "unitCode": "CEL"}
                ],
                "location": {"value": {"coordinates": [2.3, 48.8]}}
            }"#,
        );

        let rows = world_map_rows(&entities, "temperature", "depth");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metric, "10");
        assert_eq!(rows[0].metadata, "10 CEL (20 MTR), 12 CEL");
    }

    #[test]
    fn excluded_entities_do_not_shift_other_rows() {
        let entities = parse_entities(
            br#"[
                {"id": "no-location", "temperature": {"value": 1}},
                {"id": "no-metric", "location": {"value": {"coordinates": [0.5, 0.5]}}},
                {"id": "placed", "temperature": {"value": 3}, "location": {"value": {"coordinates": [7.0, 8.0]}}}
            ]"#,
        );

        let frame = transform_to_world_map("Hive", &entities, "temperature", "depth");

        assert!(frame.is_aligned());
        assert_eq!(frame.row_count(), 1);
        assert_eq!(frame.field(ID_FIELD).unwrap().values.as_strings().unwrap(), ["placed"]);
        assert_eq!(frame.field(LATITUDE_FIELD).unwrap().values.as_floats().unwrap(), [8.0]);
        assert_eq!(frame.field(LONGITUDE_FIELD).unwrap().values.as_floats().unwrap(), [7.0]);
    }

    #[test]
    fn no_selector_means_no_metadata_column() {
        let frame = transform_to_world_map("Hive", &[], "temperature", "");

        assert_eq!(frame.fields.len(), 5);
        assert_eq!(frame.row_count(), 0);
    }
}
