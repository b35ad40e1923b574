//! Split-archive set validation for zip-packaged releases.
//!
//! Each `.zip` container carries one payload fragment (`.rar`/`.rNN`/...)
//! plus a `.diz` whose `[n/m]` counter says how many containers the set
//! has. Per directory, the number of fragments must match the declared
//! total and fragment sizes may take at most two values. Nothing is hashed.

mod counter;
mod error;
mod scan;
mod validate;

pub use counter::{classify, parse_counter, EntryKind, VolumeCounter};
pub use error::ArchiveSetError;
pub use scan::{scan_container, ArchiveFragment, AuxText};
pub use validate::{
    check_directory, check_release, scan_directory, validate, ArchiveSetResult, ReleaseArchives,
};
