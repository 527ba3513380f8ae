use thiserror::Error;

/// Conditions that leave the widget in an unusable or ambiguous state. Everything reachable
/// during normal drag interaction degrades to a logged no-op instead; only construction and
/// serialization can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The selector given at construction did not resolve to an element.
    #[error("provided root element does not exist")]
    MissingRoot,

    /// Another instance is already bound to the same root element.
    #[error("an instance is already bound to this element")]
    AlreadyBound,

    /// Serialization was requested for a root with no list element anywhere under it.
    #[error("no list element found to serialize")]
    NoList,
}
