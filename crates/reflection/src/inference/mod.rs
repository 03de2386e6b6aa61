//! Frame building and expression type inference.

pub mod builder;
pub mod frame;
pub mod member_type;
pub mod resolver;

pub use builder::FrameBuilder;
pub use frame::{Assignment, AssignmentQuery, Assignments, Frame};
pub use member_type::MemberTypeResolver;
pub use resolver::SymbolContextResolver;
