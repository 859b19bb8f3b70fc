use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ngsild::entity::json_kind;

/// Attribute key carrying the entity's GeoProperty.
pub const LOCATION_KEY: &str = "location";

/// Shape of one entity attribute, discovered from its JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute<'a> {
    /// Plain string such as `id`, `type` or a top level timestamp.
    Scalar(&'a str),
    /// Property or Relationship object.
    Single(Property<'a>),
    /// Repeated observations of the same attribute, in payload order.
    Multi(Vec<Property<'a>>),
    /// The entity's GeoProperty.
    Location(Location),
}

/// View over one Property/Relationship object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Property<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Property<'a> {
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Property payload.
    pub fn value(&self) -> Option<&'a Value> {
        self.fields.get("value")
    }

    /// Relationship target.
    pub fn object(&self) -> Option<&'a Value> {
        self.fields.get("object")
    }

    pub fn unit_code(&self) -> Option<&'a Value> {
        self.fields.get("unitCode")
    }

    pub fn created_at(&self) -> Option<&'a Value> {
        self.fields.get("createdAt")
    }

    pub fn modified_at(&self) -> Option<&'a Value> {
        self.fields.get("modifiedAt")
    }

    /// Any field of the object, including nested sub-properties.
    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.fields.get(name)
    }
}

/// GeoJSON geometry of a `location` attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "type", default)]
    pub geometry_type: String,
    /// `[longitude, latitude]` for a Point.
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl Location {
    /// Decode the `value` member of a location attribute.
    ///
    /// Failures are logged and produce a location without coordinates.
    pub fn from_attribute(attribute: &Map<String, Value>) -> Self {
        let Some(value) = attribute.get("value") else {
            log::warn!("Location attribute has no value");
            return Location::default();
        };

        match Location::deserialize(value) {
            Ok(location) => location,
            Err(e) => {
                log::warn!("Unable to decode location {}: {}", value, e);
                Location::default()
            }
        }
    }

    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.first().copied()
    }

    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.get(1).copied()
    }

    /// `(latitude, longitude)` when both are present.
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        Some((self.latitude()?, self.longitude()?))
    }
}

/// Classify the raw JSON value of one attribute.
///
/// Returns `None` for values no projector can use (numbers, booleans,
/// null); the caller skips the key.
pub fn classify<'a>(key: &str, raw: &'a Value) -> Option<Attribute<'a>> {
    match raw {
        Value::String(s) => Some(Attribute::Scalar(s.as_str())),
        Value::Array(items) => {
            let occurrences = items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| match item {
                    Value::Object(fields) => Some(Property::new(fields)),
                    other => {
                        log::warn!(
                            "{}[{}] is of a type I don't know how to handle: {}",
                            key,
                            index,
                            json_kind(other)
                        );
                        None
                    }
                })
                .collect();
            Some(Attribute::Multi(occurrences))
        }
        Value::Object(fields) if key == LOCATION_KEY => {
            Some(Attribute::Location(Location::from_attribute(fields)))
        }
        Value::Object(fields) => Some(Attribute::Single(Property::new(fields))),
        other => {
            log::warn!(
                "{} is of a type I don't know how to handle: {}",
                key,
                json_kind(other)
            );
            None
        }
    }
}
