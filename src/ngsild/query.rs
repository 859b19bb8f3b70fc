use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ngsild::entity::parse_entities;
use crate::ngsild::frame::Frame;
use crate::ngsild::table::transform_to_table;
use crate::ngsild::worldmap::transform_to_world_map;

/// Output format requested by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFormat {
    Table,
    WorldMap,
}

impl QueryFormat {
    /// `"worldmap"` selects the map projection; anything else is a table.
    pub fn parse(format: &str) -> Self {
        if format == "worldmap" {
            QueryFormat::WorldMap
        } else {
            QueryFormat::Table
        }
    }
}

/// Query parameters as sent by the query editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryModel {
    pub entity_id: String,
    pub entity_type: String,
    /// NGSI-LD `q` filter, forwarded verbatim to the broker.
    pub value_filter_query: String,
    pub format: String,
    /// Metric attribute for the map projection.
    pub attribute: String,
    pub metadata_selector: String,
    /// JSON-LD context URL sent with the lookup.
    pub context: String,
}

impl QueryModel {
    pub fn from_json(json: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(json)
    }

    pub fn output_format(&self) -> QueryFormat {
        QueryFormat::parse(&self.format)
    }

    /// Lookup by id when one is given, otherwise by type.
    pub fn is_by_id(&self) -> bool {
        !self.entity_id.is_empty()
    }

    /// Name of the produced frame.
    pub fn frame_name(&self) -> &str {
        if self.is_by_id() {
            &self.entity_id
        } else {
            &self.entity_type
        }
    }

    /// Flatten a broker payload into the projection this query asks for.
    pub fn project(&self, body: &[u8]) -> Frame {
        let entities = parse_entities(body);
        let frame = match self.output_format() {
            QueryFormat::WorldMap => transform_to_world_map(
                self.frame_name(),
                &entities,
                &self.attribute,
                &self.metadata_selector,
            ),
            QueryFormat::Table => {
                transform_to_table(self.frame_name(), &entities, &self.metadata_selector)
            }
        };
        log::debug!(
            "Projected {} entities into {} rows for {}",
            entities.len(),
            frame.row_count(),
            frame.name
        );
        frame
    }
}

/// One query of a batch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuery {
    pub ref_id: String,
    /// Raw query model JSON.
    pub json: serde_json::Value,
}

impl DataQuery {
    pub fn new(ref_id: impl Into<String>, model: &QueryModel) -> serde_json::Result<Self> {
        Ok(Self {
            ref_id: ref_id.into(),
            json: serde_json::to_value(model)?,
        })
    }

    pub fn model(&self) -> serde_json::Result<QueryModel> {
        QueryModel::deserialize(&self.json)
    }
}

/// Result of one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataResponse {
    pub frames: Vec<Frame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DataResponse {
    pub fn with_frame(frame: Frame) -> Self {
        Self {
            frames: vec![frame],
            error: None,
        }
    }

    pub fn with_error(error: impl ToString) -> Self {
        Self {
            frames: vec![],
            error: Some(error.to_string()),
        }
    }
}

/// Responses of a batch, keyed by ref id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDataResponse {
    pub responses: BTreeMap<String, DataResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngsild::{table, worldmap};

    #[test]
    fn worldmap_format_selects_map_projection() {
        assert_eq!(QueryFormat::parse("worldmap"), QueryFormat::WorldMap);
        assert_eq!(QueryFormat::parse("table"), QueryFormat::Table);
        assert_eq!(QueryFormat::parse(""), QueryFormat::Table);
        assert_eq!(QueryFormat::parse("WorldMap"), QueryFormat::Table);
    }

    #[test]
    fn decodes_editor_json_with_missing_fields() {
        let model = QueryModel::from_json(
            br#"{"entityType": "Apiary", "format": "worldmap", "attribute": "temperature", "refId": "A"}"#,
        )
        .unwrap();

        assert_eq!(model.entity_type, "Apiary");
        assert_eq!(model.attribute, "temperature");
        assert_eq!(model.metadata_selector, "");
        assert!(!model.is_by_id());
        assert_eq!(model.frame_name(), "Apiary");
    }

    #[test]
    fn malformed_query_json_is_an_error() {
        assert!(QueryModel::from_json(br#"{"entityId": 5}"#).is_err());
        assert!(QueryModel::from_json(b"nope").is_err());
    }

    #[test]
    fn project_dispatches_on_format() {
        let body: &[u8] = br#"{"id": "e1", "temperature": {"value": 5},
            "location": {"value": {"coordinates": [2.3, 48.8]}}}"#;
        let mut model = QueryModel {
            entity_id: "e1".to_string(),
            attribute: "temperature".to_string(),
            ..Default::default()
        };

        let frame = model.project(body);
        assert_eq!(frame.name, "e1");
        assert!(frame.field(table::VALUE_FIELD).is_some());

        model.format = "worldmap".to_string();
        let frame = model.project(body);
        assert_eq!(frame.row_count(), 1);
        assert!(frame.field(worldmap::LATITUDE_FIELD).is_some());
    }

    #[test]
    fn project_tolerates_broken_payload() {
        let model = QueryModel {
            entity_id: "e1".to_string(),
            ..Default::default()
        };

        let frame = model.project(b"<html>502 Bad Gateway</html>");

        assert_eq!(frame.row_count(), 0);
        assert!(frame.is_aligned());
    }

    #[test]
    fn data_query_round_trips_model() {
        let model = QueryModel {
            entity_id: "urn:ngsi-ld:Apiary:1".to_string(),
            metadata_selector: "depth".to_string(),
            ..Default::default()
        };

        let query = DataQuery::new("A", &model).unwrap();

        assert_eq!(query.json["entityId"], "urn:ngsi-ld:Apiary:1");
        assert_eq!(query.model().unwrap(), model);
    }
}
