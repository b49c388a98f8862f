// Gateway module for markup documents - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod element;
mod parser;

// Public re-exports - the ONLY way to access document functionality
pub use element::{Element, Node};
pub use parser::parse;
