use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable classification.
/// Every fallible public entry point returns this type; domain errors raised
/// by collaborators are folded in through the `From` impls below.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Underlying cause, kept for access errors raised by the transport.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            source: None,
        }
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Construct a configuration error raised while building a statement.
    pub(crate) fn statement_config(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Configuration, ErrorOrigin::Statement, message)
    }

    /// Construct a configuration error raised by the planner.
    pub(crate) fn planner_config(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Configuration, ErrorOrigin::Planner, message)
    }

    /// Construct a session-origin configuration error.
    pub(crate) fn session_config(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Configuration, ErrorOrigin::Session, message)
    }

    /// Construct a materialization error.
    pub(crate) fn mapping(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Mapping, ErrorOrigin::Materialize, message)
    }

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self.class, ErrorClass::Configuration)
    }

    #[must_use]
    pub const fn is_schema(&self) -> bool {
        matches!(self.class, ErrorClass::Schema)
    }

    #[must_use]
    pub const fn is_access(&self) -> bool {
        matches!(self.class, ErrorClass::Access)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Error taxonomy used to decide propagation policy.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Caller supplied an incomplete or contradictory operation.
    Configuration,
    /// Resource or column metadata could not be resolved.
    Schema,
    /// The store or the transport rejected or failed a statement.
    Access,
    /// Row to instance conversion failed.
    Mapping,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Configuration => "configuration",
            Self::Schema => "schema",
            Self::Access => "access",
            Self::Mapping => "mapping",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Planner,
    Statement,
    Catalog,
    Transport,
    Materialize,
    Session,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Planner => "planner",
            Self::Statement => "statement",
            Self::Catalog => "catalog",
            Self::Transport => "transport",
            Self::Materialize => "materialize",
            Self::Session => "session",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}
