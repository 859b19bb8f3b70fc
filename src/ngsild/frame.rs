use serde::{Deserialize, Serialize};

/// Column data of a [`Field`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum FieldValues {
    String(Vec<String>),
    Float(Vec<f64>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            FieldValues::String(values) => values.len(),
            FieldValues::Float(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            FieldValues::String(values) => Some(values),
            FieldValues::Float(_) => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            FieldValues::Float(values) => Some(values),
            FieldValues::String(_) => None,
        }
    }
}

/// Named column of a [`Frame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub values: FieldValues,
}

impl Field {
    pub fn strings(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values: FieldValues::String(values),
        }
    }

    pub fn floats(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values: FieldValues::Float(values),
        }
    }
}

/// Tabular query result: equally long named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: vec![],
        }
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Number of rows, taken from the first column.
    pub fn row_count(&self) -> usize {
        self.fields.first().map_or(0, |field| field.values.len())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    /// True when every column has the same length.
    pub fn is_aligned(&self) -> bool {
        let rows = self.row_count();
        self.fields.iter().all(|field| field.values.len() == rows)
    }
}
