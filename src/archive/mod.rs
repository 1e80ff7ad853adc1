// Module declarations
mod entry;
mod journal;
mod types;

// Re-export public types
pub use entry::{Entry, EntryDownloadInfo};
pub use journal::{Child, JournalSummary};
pub use types::{ArchiveType, Gender};
