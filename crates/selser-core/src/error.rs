use crate::dom::meta::SourceRange;

/// Request-scoped serialization failures.
///
/// Only `ResourceLimitExceeded` is ever returned to the caller; the other
/// kinds are recovered internally (logged, then degraded to re-emission or
/// best-effort text) because partial loss of source reuse is preferable to
/// failing the whole request.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("source range {0:?} is malformed or out of bounds")]
    InvalidSourceRange(SourceRange),

    #[error("selective serialization requested but no original content is available")]
    MissingOriginalContent,

    #[error("{what} limit exceeded ({limit})")]
    ResourceLimitExceeded { what: &'static str, limit: usize },

    #[error("no serialization rule for construct <{0}>")]
    UnsupportedConstruct(String),
}
