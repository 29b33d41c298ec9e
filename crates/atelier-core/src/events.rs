//! Pipeline lifecycle events.

use atelier_history::GenerationRecord;

/// Events broadcast while a generation round-trip runs.
///
/// Failures are soft: the previous displayed state is preserved by the
/// presentation layer and the next admitted request is the natural retry.
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    /// A sketch was admitted and dispatched to the backend.
    Started,
    /// The round-trip succeeded; the result is always delivered, the record
    /// is absent when archiving it failed.
    Completed {
        /// The freshly persisted record, if archiving succeeded.
        record: Option<GenerationRecord>,
        /// PNG bytes of the generated result.
        image: Vec<u8>,
    },
    /// The round-trip produced no usable image this round.
    Failed {
        /// Human-readable failure description.
        reason: String,
    },
}
