use crate::shared::infrastructure::event_store::EventRecord;

pub fn make_event_record(stream_id: &str, version: i64) -> EventRecord {
    EventRecord {
        stream_id: stream_id.to_string(),
        version,
        event_type: "Created".to_string(),
        data: r#"{"customer":"c-0001"}"#.to_string(),
    }
}
