pub mod duration;
pub mod record;
pub mod select;
pub mod strings;
pub mod types;

pub use record::Record;
pub use select::{AutoSelect, Candidate, Selector};
pub use strings::StringTable;
pub use types::{ExternalSource, LookupIds, MediaType};
