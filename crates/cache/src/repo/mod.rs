pub mod entries;
pub mod meta;
