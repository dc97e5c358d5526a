//! Asset management
//!
//! Description loading/parsing and the name-keyed object cache used to
//! deduplicate repeated sub-objects during scene construction.

pub mod description;
pub mod object_cache;

pub use description::{Description, DescriptionError, OneOrMany};
pub use object_cache::ObjectCache;
