//! Backends for the firrtlator compiler: code generators that render a
//! circuit to a textual artifact without changing it.
mod dot;
mod firrtl;
mod traits;
mod tree;

pub use dot::DotBackend;
pub use firrtl::FirrtlBackend;
pub use traits::{Backend, BackendDescriptor, BackendRegistry};
pub use tree::TreeBackend;
