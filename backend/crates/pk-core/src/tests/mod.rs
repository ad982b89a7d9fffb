mod attribute_schema;
mod snapshot;
