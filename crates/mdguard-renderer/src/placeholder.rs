//! Placeholder allocation.
//!
//! Placeholders stand in for safeguarded content while the markdown converter
//! runs. They consist of ASCII letters and digits only, so the converter
//! neither escapes nor splits them, and they read as a single word inside a
//! paragraph.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use regex::Regex;

const PREFIX: &str = "MDGUARD";
const SUFFIX: &str = "X";

static GLOBAL: LazyLock<PlaceholderAllocator> = LazyLock::new(PlaceholderAllocator::new);
static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"MDGUARD\d{12,}X").unwrap());

/// Shared, monotonically increasing placeholder counter.
///
/// Clones share the same counter, so placeholders allocated through any clone
/// never collide. [`PlaceholderAllocator::global`] returns the process-wide
/// allocator used by default.
///
/// # Example
///
/// ```
/// use mdguard_renderer::PlaceholderAllocator;
///
/// let allocator = PlaceholderAllocator::new();
/// let first = allocator.next();
/// let second = allocator.clone().next();
///
/// assert_eq!(first, "MDGUARD000000000001X");
/// assert_eq!(second, "MDGUARD000000000002X");
/// ```
#[derive(Clone, Debug, Default)]
pub struct PlaceholderAllocator {
    counter: Arc<AtomicU64>,
}

impl PlaceholderAllocator {
    /// Create an allocator with its own counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide allocator.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    /// Allocate the next placeholder.
    #[must_use]
    pub fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{PREFIX}{n:012}{SUFFIX}")
    }

    /// Number of placeholders allocated so far.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

/// Remove all placeholders from `text`.
///
/// Used where converted text feeds derived values, such as heading slugs,
/// that must not depend on the counter.
#[must_use]
pub fn strip_placeholders(text: &str) -> Cow<'_, str> {
    PLACEHOLDER_PATTERN.replace_all(text, "")
}
