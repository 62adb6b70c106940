mod document;
mod error;
mod fs_store;
mod memory_store;
mod object_store;
mod timed_store;

pub use document::*;
pub use error::*;
pub use fs_store::*;
pub use memory_store::*;
pub use object_store::*;
pub use timed_store::*;
