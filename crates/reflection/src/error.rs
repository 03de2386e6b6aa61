use phpscope_api::ClassName;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReflectionError {
    #[error("Could not find source for class \"{class}\": {reason}")]
    SourceNotFound { class: ClassName, reason: String },
    #[error("Class \"{0}\" not found")]
    ClassNotFound(ClassName),
    #[error("\"{0}\" is not a class")]
    NotAClass(ClassName),
    #[error("\"{0}\" is not an interface")]
    NotAnInterface(ClassName),
    #[error("Class \"{class}\" has no method named \"{method}\"")]
    MethodNotFound { class: ClassName, method: String },
    #[error("Cyclic class hierarchy detected while reflecting \"{0}\"")]
    CyclicHierarchy(ClassName),
    #[error("Parsing error: {0}")]
    Parser(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReflectionError {
    /// Lookup failures that degrade to `unknown` instead of aborting.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ReflectionError::SourceNotFound { .. } | ReflectionError::ClassNotFound(_)
        )
    }
}

impl From<serde_json::Error> for ReflectionError {
    fn from(err: serde_json::Error) -> Self {
        ReflectionError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReflectionError>;
