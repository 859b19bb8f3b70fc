use ngsild_datasource::ngsild::datasource::DataSource;
use ngsild_datasource::ngsild::query::{DataQuery, QueryModel};

use crate::config::Secrets;
use crate::scenarios::print_frame;

pub async fn run(source: &DataSource, secrets: &Secrets) -> Result<(), String> {
    println!("Scenario: table");

    let model = QueryModel {
        entity_id: secrets.sample_entity_id.clone(),
        context: secrets.sample_context.clone(),
        metadata_selector: secrets.sample_metadata_selector.clone(),
        ..Default::default()
    };
    let query = DataQuery::new("A", &model).map_err(|e| e.to_string())?;

    let response = source.query_data(&[query]).await;
    let result = response
        .responses
        .get("A")
        .ok_or("No response for query A")?;
    if let Some(error) = &result.error {
        return Err(error.clone());
    }

    for frame in &result.frames {
        print_frame(frame);
    }

    Ok(())
}
