mod file;
mod file_snapshot;

pub use file::{File, FileSource, FileSourceType};
pub use file_snapshot::FileSnapshot;
