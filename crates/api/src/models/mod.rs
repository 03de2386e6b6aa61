pub mod context;
pub mod fqn;
pub mod symbol;
pub mod types;
pub mod value;

pub use context::SymbolContext;
pub use fqn::ClassName;
pub use symbol::{Position, Symbol, SymbolKind};
pub use types::{RelativeKind, ScalarKind, Type, TypeEntry, TypeSource, Types};
pub use value::{ArrayKey, ArrayValue, Value};
