use crate::ngsild::attribute::{Attribute, LOCATION_KEY, Location, Property, classify};
use crate::ngsild::entity::{CONTEXT_KEY, Entity};
use crate::ngsild::format::{
    build_display_string, extract_core, extract_metadata, format_timestamp,
};
use crate::ngsild::frame::{Field, Frame};

pub const ATTRIBUTE_FIELD: &str = "Attribute";
pub const VALUE_FIELD: &str = "Value";
pub const CREATED_AT_FIELD: &str = "Created at";
pub const MODIFIED_AT_FIELD: &str = "Modified at";

/// Column buffers of the attribute/value table. Every push appends to all
/// columns so they stay the same length.
#[derive(Debug, Default)]
struct TableColumns {
    attributes: Vec<String>,
    values: Vec<String>,
    metadata: Vec<String>,
    created_at: Vec<String>,
    modified_at: Vec<String>,
}

impl TableColumns {
    fn push_location(&mut self, key: &str, location: &Location) {
        self.attributes.push(key.to_string());
        self.values.push(format_coordinates(&location.coordinates));
        self.metadata.push(String::new());
        self.created_at.push(String::new());
        self.modified_at.push(String::new());
    }

    fn push_property(&mut self, key: &str, property: &Property<'_>, selector: &str) {
        let core = extract_core(property);
        let metadata = extract_metadata(property, selector);

        self.attributes.push(key.to_string());
        self.values
            .push(build_display_string("", &core.value, &core.unit_code, "", "", ""));
        self.metadata.push(if metadata.found {
            build_display_string("", &metadata.value, &metadata.unit_code, "", "", "")
        } else {
            String::new()
        });
        self.created_at.push(format_timestamp(&core.created_at));
        self.modified_at.push(format_timestamp(&core.modified_at));
    }

    fn into_frame(self, name: &str, selector: &str) -> Frame {
        let mut frame = Frame::new(name);
        frame.push(Field::strings(ATTRIBUTE_FIELD, self.attributes));
        frame.push(Field::strings(VALUE_FIELD, self.values));
        if !selector.is_empty() {
            frame.push(Field::strings(selector, self.metadata));
        }
        frame.push(Field::strings(CREATED_AT_FIELD, self.created_at));
        frame.push(Field::strings(MODIFIED_AT_FIELD, self.modified_at));
        frame
    }
}

/// Render coordinates as `[%f %f]`, six decimals each.
fn format_coordinates(coordinates: &[f64]) -> String {
    let parts: Vec<String> = coordinates.iter().map(|c| format!("{:.6}", c)).collect();
    format!("[{}]", parts.join(" "))
}

/// Flatten entities into one row per attribute occurrence.
///
/// Columns are `Attribute, Value, [selector,] Created at, Modified at`; the
/// selector column only exists when `metadata_selector` is not empty.
pub fn transform_to_table(name: &str, entities: &[Entity], metadata_selector: &str) -> Frame {
    let mut columns = TableColumns::default();

    for entity in entities {
        for (key, raw) in &entity.attributes {
            if key == CONTEXT_KEY {
                continue;
            }

            match classify(key, raw) {
                None | Some(Attribute::Scalar(_)) => {}
                Some(Attribute::Location(location)) => {
                    columns.push_location(LOCATION_KEY, &location);
                }
                Some(Attribute::Single(property)) => {
                    columns.push_property(key, &property, metadata_selector);
                }
                Some(Attribute::Multi(occurrences)) => {
                    for property in &occurrences {
                        columns.push_property(key, property, metadata_selector);
                    }
                }
            }
        }
    }

    columns.into_frame(name, metadata_selector)
}
