use ngsild_datasource::ngsild::datasource::DataSource;
use ngsild_datasource::ngsild::query::{DataQuery, QueryModel};

use crate::config::Secrets;
use crate::scenarios::print_frame;

pub async fn run(source: &DataSource, secrets: &Secrets) -> Result<(), String> {
    println!("Scenario: worldmap");

    let model = QueryModel {
        entity_type: secrets.sample_entity_type.clone(),
        format: "worldmap".to_string(),
        attribute: secrets.sample_map_metric.clone(),
        metadata_selector: secrets.sample_metadata_selector.clone(),
        context: secrets.sample_context.clone(),
        ..Default::default()
    };
    let query = DataQuery::new("B", &model).map_err(|e| e.to_string())?;

    let response = source.query_data(&[query]).await;
    let result = response
        .responses
        .get("B")
        .ok_or("No response for query B")?;
    if let Some(error) = &result.error {
        return Err(error.clone());
    }

    for frame in &result.frames {
        print_frame(frame);
    }

    Ok(())
}
