//! GIR document handling
//!
//! [`parser`] is the XML boundary: it produces the raw element tree
//! ([`raw::RawNode`]) with a synthetic [`raw::NodeId`] on every element.
//! [`model`] lifts that tree into the closed set of typed entities the rest
//! of the crate works with.

pub mod model;
pub mod parser;
pub mod raw;

pub use model::{
    Alias, ArrayType, ClassKind, ClassLike, Direction, EnumMember, Enumeration, Function,
    FunctionKind, Include, NamedType, Namespace, Repository, TypeRef, Variable, VariableKind,
};
pub use parser::parse_gir;
pub use raw::{NodeId, NodeIdGen, RawNode};

#[cfg(test)]
mod tests;
