pub mod memory;
pub mod seed;
pub mod store;

pub use memory::MemoryStore;
pub use store::{MessagePatch, Store};
