mod error;
mod metadata;
mod store;

pub use error::{QaError, Result};
pub use metadata::{
    Formula, ObjectKind, Parameter, ReportInfo, ReportMetadata, ReportObject, Section, Table,
};
pub use store::MetadataStore;
