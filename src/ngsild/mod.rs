/// Attribute shape discovery.
pub mod attribute;
/// Query batches against a configured broker.
pub mod datasource;
/// Entity records and payload decoding.
pub mod entity;
/// Display strings and timestamps.
pub mod format;
/// Tabular query results.
pub mod frame;
/// Query model and projection dispatch.
pub mod query;
/// Context broker HTTP client.
pub mod serviceclient;
/// Data source configuration.
pub mod settings;
/// Attribute/value table projection.
pub mod table;
/// Map projection.
pub mod worldmap;
