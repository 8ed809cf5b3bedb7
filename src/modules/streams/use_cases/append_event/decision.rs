#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecideError {
    #[error("The requested version is invalid. Current Version: {current_version}")]
    VersionConflict { current_version: i64 },

    #[error("stream is at version {current_version} and cannot take another event")]
    VersionsExhausted { current_version: i64 },
}

#[derive(Debug, PartialEq, Eq)]
pub enum Decision {
    Accepted { version: i64 },
    Rejected { reason: DecideError },
}
