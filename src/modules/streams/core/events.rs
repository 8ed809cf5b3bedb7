use crate::shared::infrastructure::event_store::EventRecord;

/// An event as submitted by a writer, before it is given a place in its stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewEvent {
    pub event_type: String,
    pub data: String,
}

impl NewEvent {
    pub fn new(event_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            data: data.into(),
        }
    }

    pub fn into_record(self, stream_id: &str, version: i64) -> EventRecord {
        EventRecord {
            stream_id: stream_id.to_owned(),
            version,
            event_type: self.event_type,
            data: self.data,
        }
    }
}
