pub mod format;
pub mod version;
