pub mod bloom;
pub mod null;

pub use bloom::BloomExistenceFilter;
pub use null::NullExistenceFilter;
