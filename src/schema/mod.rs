pub mod descriptor;
pub mod error;
pub mod field;

pub use descriptor::{SchemaDescriptor, ID_FIELD};
pub use error::{SchemaError, ValidationError};
pub use field::{FieldDef, FieldType};
