use crate::modules::streams::core::events::NewEvent;
use crate::modules::streams::core::expected_version::ExpectedVersion;
use crate::modules::streams::use_cases::append_event::command::AppendEvent;

pub struct AppendEventBuilder {
    inner: AppendEvent,
}

impl Default for AppendEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl AppendEventBuilder {
    pub fn new() -> Self {
        Self {
            inner: AppendEvent {
                stream_id: "order-0001".to_string(),
                expected_version: ExpectedVersion::Next,
                event: NewEvent::new("Created", r#"{"customer":"c-0001"}"#),
            },
        }
    }

    pub fn stream_id(mut self, v: impl Into<String>) -> Self {
        self.inner.stream_id = v.into();
        self
    }

    pub fn expected_version(mut self, v: ExpectedVersion) -> Self {
        self.inner.expected_version = v;
        self
    }

    pub fn event_type(mut self, v: impl Into<String>) -> Self {
        self.inner.event.event_type = v.into();
        self
    }

    pub fn data(mut self, v: impl Into<String>) -> Self {
        self.inner.event.data = v.into();
        self
    }

    pub fn build(self) -> AppendEvent {
        self.inner
    }
}
