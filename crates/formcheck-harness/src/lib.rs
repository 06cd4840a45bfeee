#![forbid(unsafe_code)]

//! Test host and page-dump snapshot testing for formcheck.
//!
//! - **In-memory page**: [`MemoryPage`] implements `FormHost`, journals every
//!   host call, and dumps its visible state as text.
//! - **Fixtures**: the registration page and its rules.
//! - **Snapshot testing**: compares a page dump against a stored `.snap` file
//!   record by record, naming each field or slot whose state differs.
//!
//! # Quick Start
//!
//! ```ignore
//! use formcheck_harness::{assert_page_snapshot, fixtures};
//!
//! #[test]
//! fn blocked_submit() {
//!     let mut form = fixtures::registration_form().unwrap();
//!     form.attach().unwrap();
//!     form.handle_event(FormEvent::Submit);
//!     assert_page_snapshot!("blocked_submit", form.host());
//! }
//! ```
//!
//! # Updating Snapshots
//!
//! Run tests with `BLESS=1` to create or update snapshot files:
//!
//! ```sh
//! BLESS=1 cargo test -p formcheck-harness
//! ```
//!
//! Snapshot files are stored under `tests/snapshots/` relative to the
//! crate's `CARGO_MANIFEST_DIR`.

pub mod fixtures;
pub mod page;
pub mod snapshot;

pub use page::{HostOp, JournalEntry, MemoryPage, Slot, StrengthSlot, SubmitControl};
pub use snapshot::{
    DumpChange, DumpRecord, assert_dump_snapshot, diff_dump_text, diff_dumps, parse_dump,
};

/// Assert that a page matches a stored snapshot.
///
/// Uses `CARGO_MANIFEST_DIR` to locate the snapshot directory automatically.
#[macro_export]
macro_rules! assert_page_snapshot {
    ($name:expr, $page:expr) => {
        $crate::assert_dump_snapshot($name, $page, env!("CARGO_MANIFEST_DIR"))
    };
}
