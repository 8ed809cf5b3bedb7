/// Where a writer wants its event to land in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Whatever version follows the current one.
    Next,
    /// Exactly this version, or nothing.
    Exact(i64),
}

/// Versions start at 1, so 0 stands for an empty stream.
pub const NO_EVENTS: i64 = 0;
