pub mod aggregate;
pub mod arena;

pub use arena::{FileNode, FileTree, NodeId};
