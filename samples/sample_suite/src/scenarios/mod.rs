pub mod table;
pub mod worldmap;

use ngsild_datasource::ngsild::frame::{FieldValues, Frame};

/// Print a frame as tab separated rows.
pub fn print_frame(frame: &Frame) {
    println!("Frame {} ({} rows)", frame.name, frame.row_count());
    println!("{}", frame.field_names().join("\t"));
    for row in 0..frame.row_count() {
        let cells: Vec<String> = frame
            .fields
            .iter()
            .map(|field| match &field.values {
                FieldValues::String(values) => values[row].clone(),
                FieldValues::Float(values) => values[row].to_string(),
            })
            .collect();
        println!("{}", cells.join("\t"));
    }
}
