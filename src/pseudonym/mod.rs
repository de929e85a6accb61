pub mod allocator;
pub mod names;

pub use allocator::{IdAllocator, IdMap, NameAllocator, NameMap, DEFAULT_ID_RANGE};
pub use names::{GeneratedNames, NameSource};
