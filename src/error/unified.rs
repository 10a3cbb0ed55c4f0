//! Error classification.

/// Broad error category for routing caller-side handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Payload,
    Authentication,
    RateLimit,
    Network,
    Server,
    Api,
    Configuration,
    Serialization,
    Usage,
    Unknown,
}

/// Suggested next step for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Ask the model again, usually with a stricter instruction.
    Reprompt,
    CheckCredentials,
    CheckConfiguration,
    FixInput,
    TryLater,
    ContactSupport,
}
