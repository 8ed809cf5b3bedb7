use crate::modules::streams::core::events::NewEvent;
use crate::modules::streams::core::expected_version::ExpectedVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendEvent {
    pub stream_id: String,
    pub expected_version: ExpectedVersion,
    pub event: NewEvent,
}
