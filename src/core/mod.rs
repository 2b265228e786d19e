pub mod batch;
pub mod etl;
pub mod transform;

pub use crate::domain::model::{
    BatchSummary, FlushOutcome, NormalizedCountryRecord, RawCountryRecord,
};
pub use crate::domain::ports::{BlobSink, ConfigProvider, RecordSource};
pub use crate::utils::error::Result;
