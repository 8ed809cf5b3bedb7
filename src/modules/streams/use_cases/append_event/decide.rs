use crate::modules::streams::core::expected_version::ExpectedVersion;
use crate::modules::streams::use_cases::append_event::decision::{DecideError, Decision};

/// Pick the version the next event of a stream gets, given the stream's current one.
///
/// An explicit version is accepted only when it is exactly `current + 1`. Writers that
/// are behind and writers that skip ahead are both rejected.
pub fn decide_version(current_version: i64, expected: ExpectedVersion) -> Decision {
    let Some(next) = current_version.checked_add(1) else {
        return Decision::Rejected {
            reason: DecideError::VersionsExhausted { current_version },
        };
    };
    match expected {
        ExpectedVersion::Next => Decision::Accepted { version: next },
        ExpectedVersion::Exact(version) if version == next => Decision::Accepted { version },
        ExpectedVersion::Exact(_) => Decision::Rejected {
            reason: DecideError::VersionConflict { current_version },
        },
    }
}
