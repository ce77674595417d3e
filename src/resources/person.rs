use axum::routing::get;

use crate::handlers::resource::{self, ResourceRouter};
use crate::schema::{SchemaDescriptor, SchemaError};

const PERSON_SCHEMA: &str = include_str!("../../schemas/person.yaml");

pub fn descriptor() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::from_yaml_str(PERSON_SCHEMA)
}

/// Person keeps the generic five and adds `GET /person/count`
pub fn extend(router: ResourceRouter) -> ResourceRouter {
    router.route("/count", get(resource::count))
}
