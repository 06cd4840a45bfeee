#![forbid(unsafe_code)]

//! Page-dump snapshots.
//!
//! [`MemoryPage::dump`] writes one record per line, `<kind> <key> <state>`:
//!
//! ```text
//! form dynamicForm
//! field username text [error] value="ab"
//! slot error-username shown "Username must be ..."
//! submit submitBtn enabled "Create Account"
//! submissions 0
//! ```
//!
//! `form` and `submissions` are singletons with no key. Snapshots are compared
//! record by record, keyed by kind and key, so a mismatch names the control or
//! slot whose state moved.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::page::MemoryPage;

const SINGLETONS: [&str; 2] = ["form", "submissions"];

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One line of a page dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpRecord<'a> {
    pub kind: &'a str,
    /// Field name, slot id, meter id, or control id. Empty for singletons.
    pub key: &'a str,
    pub state: &'a str,
}

impl<'a> DumpRecord<'a> {
    /// Split a dump line. Blank lines yield `None`; trailing whitespace is
    /// ignored.
    #[must_use]
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim_end();
        if line.is_empty() {
            return None;
        }
        let (kind, rest) = line.split_once(' ').unwrap_or((line, ""));
        if SINGLETONS.contains(&kind) {
            return Some(Self {
                kind,
                key: "",
                state: rest,
            });
        }
        let (key, state) = rest.split_once(' ').unwrap_or((rest, ""));
        Some(Self { kind, key, state })
    }

    fn same_target(&self, other: &Self) -> bool {
        self.kind == other.kind && self.key == other.key
    }

    /// `kind key`, or just `kind` for singletons.
    #[must_use]
    pub fn target(&self) -> String {
        if self.key.is_empty() {
            self.kind.to_string()
        } else {
            format!("{} {}", self.kind, self.key)
        }
    }
}

impl fmt::Display for DumpRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target())?;
        if !self.state.is_empty() {
            write!(f, " {}", self.state)?;
        }
        Ok(())
    }
}

/// Parse every non-blank line of a dump.
#[must_use]
pub fn parse_dump(text: &str) -> Vec<DumpRecord<'_>> {
    text.lines().filter_map(DumpRecord::parse).collect()
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// How one record differs between a stored dump and a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpChange<'a> {
    /// Only in the fresh dump.
    Added(DumpRecord<'a>),
    /// Only in the stored dump.
    Removed(DumpRecord<'a>),
    /// Same target, different state.
    Changed {
        before: DumpRecord<'a>,
        after: DumpRecord<'a>,
    },
    /// Same target and state, out of order with respect to the records
    /// before it (document order of fields changed).
    Moved(DumpRecord<'a>),
}

impl fmt::Display for DumpChange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added(record) => write!(f, "+ {record}"),
            Self::Removed(record) => write!(f, "- {record}"),
            Self::Changed { before, after } => {
                write!(f, "~ {}: {} -> {}", before.target(), before.state, after.state)
            }
            Self::Moved(record) => write!(f, "^ {} moved", record.target()),
        }
    }
}

/// Compare two dumps record by record.
///
/// Stored records are walked in order and paired with the first unpaired
/// fresh record for the same target. Unpaired fresh records are reported
/// last, in their own order. Empty when the dumps agree.
#[must_use]
pub fn diff_dumps<'a>(expected: &'a str, actual: &'a str) -> Vec<DumpChange<'a>> {
    let expected = parse_dump(expected);
    let actual = parse_dump(actual);
    let mut paired = vec![false; actual.len()];
    let mut changes = Vec::new();
    let mut furthest: Option<usize> = None;

    for before in &expected {
        let found = actual
            .iter()
            .enumerate()
            .find(|(i, after)| !paired[*i] && before.same_target(after));
        let Some((index, after)) = found else {
            changes.push(DumpChange::Removed(*before));
            continue;
        };
        paired[index] = true;

        if before.state != after.state {
            changes.push(DumpChange::Changed {
                before: *before,
                after: *after,
            });
        } else if furthest.is_some_and(|f| index < f) {
            changes.push(DumpChange::Moved(*after));
        }
        furthest = furthest.max(Some(index));
    }

    changes.extend(
        actual
            .iter()
            .zip(&paired)
            .filter(|(_, done)| !**done)
            .map(|(record, _)| DumpChange::Added(*record)),
    );
    changes
}

/// One change per line, or an empty string when the dumps agree.
#[must_use]
pub fn diff_dump_text(expected: &str, actual: &str) -> String {
    diff_dumps(expected, actual)
        .iter()
        .map(|change| format!("{change}\n"))
        .collect()
}

// ---------------------------------------------------------------------------
// Snapshot files
// ---------------------------------------------------------------------------

fn snapshot_path(base_dir: &Path, name: &str) -> PathBuf {
    base_dir
        .join("tests")
        .join("snapshots")
        .join(format!("{name}.snap"))
}

/// `BLESS=1` (or `true`) rewrites snapshot files instead of comparing.
fn bless_requested() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Assert that a page's dump matches `tests/snapshots/<name>.snap` under
/// `base_dir`.
///
/// # Panics
///
/// * If the snapshot file does not exist and `BLESS=1` is **not** set.
/// * If any record differs from the stored snapshot.
pub fn assert_dump_snapshot(name: &str, page: &MemoryPage, base_dir: &str) {
    let path = snapshot_path(Path::new(base_dir), name);
    let actual = page.dump();

    if bless_requested() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create snapshot directory");
        }
        std::fs::write(&path, &actual).expect("failed to write snapshot");
        return;
    }

    let expected = match std::fs::read_to_string(&path) {
        Ok(expected) => expected,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => panic!(
            "\n=== No snapshot found: '{name}' ===\n\
             Expected at: {}\n\
             Run with BLESS=1 to create it.\n\n\
             Actual dump:\n{actual}",
            path.display(),
        ),
        Err(e) => panic!("Failed to read snapshot '{}': {e}", path.display()),
    };

    let changes = diff_dumps(&expected, &actual);
    if !changes.is_empty() {
        let listing: String = changes.iter().map(|c| format!("  {c}\n")).collect();
        panic!(
            "\n=== Snapshot mismatch: '{name}' ===\n\
             File: {}\n\
             {} record(s) differ (- stored, + fresh, ~ changed, ^ moved).\n\
             Set BLESS=1 to update.\n\n{listing}",
            path.display(),
            changes.len(),
        );
    }
}
