//! Static reflection and type inference for PHP source.
//!
//! Class-likes are located by name, parsed with tree-sitter and merged with
//! their ancestors into a [`ReflectionClassLike`]. Inside method bodies a
//! [`Frame`] of variable bindings is built so that any expression can be
//! resolved to a [`phpscope_api::SymbolContext`].

pub mod docblock;
pub mod error;
pub mod inference;
pub mod locator;
pub mod parser;
pub mod reflection;
pub mod reflector;

pub use docblock::{DefaultDocBlockParser, DocBlock, DocBlockParser};
pub use error::{ReflectionError, Result};
pub use inference::{Assignment, Frame, FrameBuilder, SymbolContextResolver};
pub use locator::{
    ChainSourceLocator, FileSourceLocator, SourceCodeLocator, StringSourceLocator,
    TemporarySourceLocator,
};
pub use parser::{ParsedSource, SourceCode};
pub use reflection::{
    ClassKind, ClassMember, ReflectionArgument, ReflectionArgumentCollection, ReflectionClassLike,
    ReflectionCollection, ReflectionConstant, ReflectionMethod, ReflectionParameter,
    ReflectionProperty, Visibility,
};
pub use reflector::{
    ClassReflector, ReflectionOffset, Reflector, ReflectorBuilder, ReflectorConfig,
};
