use thiserror::Error;

/// Errors surfaced by the connector store. Query-compilation failures are
/// deliberately *not* part of this enum: query compilation requires they return
/// an empty result plus a diagnostic string rather than raise into the
/// caller's scope.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connector record missing required field: {0}")]
    MissingField(&'static str),
}
