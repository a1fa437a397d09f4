pub mod gateway;
#[cfg(test)]
pub mod memory;
pub mod node;
pub mod path;
pub mod sync;
pub mod tree;
