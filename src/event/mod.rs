//! Event definitions and their durable store

pub mod error;
pub mod model;
pub mod store;

pub use error::{DefinitionError, MalformedRecord, RecordDefect, StoreError};
pub use model::{
    EventDefinition, EventDescription, EventName, Frequency, Occurrence, OccurrenceKey, Priority,
    Recurrence, MAX_RECURRENCE_SPAN_DAYS,
};
pub use store::{EventStore, LoadReport};
