//! Errors returned by the profile tree and resolver.

/// Recoverable failures of profile lookups and mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    /// Empty name, or a name with an empty dot segment.
    #[error("invalid profile name '{0}'")]
    InvalidName(String),

    /// The qualified name (or one of its parents) does not exist.
    #[error("profile '{0}' does not exist")]
    NotFound(String),

    /// No explicit profile given and no default profile configured.
    #[error("no default profile is configured")]
    NoDefaultConfigured,

    /// Stored data does not have the profile shape.
    #[error("malformed profile data: {0}")]
    MalformedProfileData(String),
}
