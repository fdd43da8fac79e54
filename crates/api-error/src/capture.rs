//! Call-stack snapshots for error provenance.
//!
//! Capture is a service behind the [`FrameCapture`] trait so tests (and
//! callers who do not want the cost) can swap it out. The process-wide default
//! is a [`BacktraceCapture`]; a different one can be installed once at startup
//! with [`install`].
//!
//! Capture is best-effort. It never fails: when the platform cannot produce a
//! backtrace, or a capture implementation panics, the result is an empty list.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_MAX_FRAMES: usize = 32;

const CRATE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");

/// Where this crate's sources lived when it was compiled.
const OWN_SOURCES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/src");

/// Symbols that belong to the language runtime or the test harness.
const RUNTIME_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "test::",
    "__rust",
    "__libc_start",
    "start_thread",
    "clone3",
    "__clone",
];

/// Source paths of the standard library and the test harness.
const RUNTIME_PATHS: &[&str] = &[
    "/rustc/",
    "/library/std/",
    "/library/core/",
    "/library/alloc/",
    "/library/test/",
    "/library/panic_unwind/",
];

/// Snapshot of the current call stack as human-readable frames, innermost first.
pub trait FrameCapture: Send + Sync {
    fn capture(&self) -> Vec<String>;
}

/// Captures via [`std::backtrace::Backtrace`], regardless of `RUST_BACKTRACE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacktraceCapture {
    max_frames: usize,
}

impl Default for BacktraceCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl BacktraceCapture {
    pub const fn new() -> Self {
        Self {
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }

    pub const fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub const fn max_frames(&self) -> usize {
        self.max_frames
    }
}

impl FrameCapture for BacktraceCapture {
    fn capture(&self) -> Vec<String> {
        if self.max_frames == 0 {
            return Vec::new();
        }
        let backtrace = Backtrace::force_capture();
        if !matches!(backtrace.status(), BacktraceStatus::Captured) {
            #[cfg(feature = "tracing")]
            tracing::trace!(status = ?backtrace.status(), "stack capture unavailable");
            return Vec::new();
        }
        render_frames(
            &backtrace.to_string(),
            self.max_frames,
            &FrameFilter::current(),
        )
    }
}

/// Records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCapture;

impl FrameCapture for NoopCapture {
    fn capture(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Returns the same frames on every call, independent of call depth.
#[derive(Debug, Clone, Default)]
pub struct FixedCapture {
    frames: Vec<String>,
}

impl FixedCapture {
    pub fn new<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            frames: frames.into_iter().map(Into::into).collect(),
        }
    }
}

impl FrameCapture for FixedCapture {
    fn capture(&self) -> Vec<String> {
        self.frames.clone()
    }
}

static DEFAULT_CAPTURE: OnceLock<Box<dyn FrameCapture>> = OnceLock::new();

/// Install the process-wide capture service.
///
/// Returns `false` if one was already installed (or already used), in which case
/// the existing service stays in place.
pub fn install<C>(capture: C) -> bool
where
    C: FrameCapture + 'static,
{
    let installed = DEFAULT_CAPTURE.set(Box::new(capture)).is_ok();
    #[cfg(feature = "tracing")]
    if !installed {
        tracing::debug!("frame capture already installed, keeping the existing service");
    }
    installed
}

/// The process-wide capture service, defaulting to [`BacktraceCapture`].
pub fn global() -> &'static dyn FrameCapture {
    DEFAULT_CAPTURE
        .get_or_init(|| Box::new(BacktraceCapture::default()))
        .as_ref()
}

/// Run `capture`, turning a panic into an empty snapshot.
pub(crate) fn capture_with(capture: &dyn FrameCapture) -> Vec<String> {
    panic::catch_unwind(AssertUnwindSafe(|| capture.capture())).unwrap_or_default()
}

struct RawFrame<'a> {
    symbol: &'a str,
    location: Option<&'a str>,
}

/// Parse the `Display` form of a std backtrace.
///
/// Lines are `N: symbol`, a bare `symbol` for inlined callers, or `at file:line:col`.
fn parse_frames(text: &str) -> Vec<RawFrame<'_>> {
    let mut frames: Vec<RawFrame<'_>> = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(last) = frames.last_mut().filter(|f| f.location.is_none()) {
                last.location = Some(location);
            }
            continue;
        }
        let symbol = match line.split_once(": ") {
            Some((index, rest)) if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) => {
                rest
            }
            _ => line,
        };
        frames.push(RawFrame {
            symbol: strip_hash(symbol),
            location: None,
        });
    }
    frames
}

/// Drop the `::h0123456789abcdef` disambiguator rustc appends to symbols.
fn strip_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.bytes().all(|b| b.is_ascii_hexdigit()) => {
            head
        }
        _ => symbol,
    }
}

/// Decides which frames are noise.
///
/// `Backtrace` prints most symbols unqualified (`capture`, `build`,
/// `catch_unwind<…>`), so frames are classified by source file first and by
/// symbol only when there is no line information.
struct FrameFilter {
    own_sources: PathBuf,
    working_dir: Option<PathBuf>,
}

impl FrameFilter {
    fn current() -> Self {
        Self {
            own_sources: PathBuf::from(OWN_SOURCES),
            working_dir: std::env::current_dir().ok(),
        }
    }

    fn is_runtime(&self, frame: &RawFrame<'_>) -> bool {
        if frame.symbol == "<unknown>" || frame.symbol == "_start" {
            return true;
        }
        if frame
            .location
            .is_some_and(|loc| RUNTIME_PATHS.iter().any(|p| loc.contains(p)))
        {
            return true;
        }
        let bare = frame.symbol.trim_start_matches('<');
        RUNTIME_PREFIXES.iter().any(|p| bare.starts_with(p))
    }

    /// Frames in this crate's own code, excluding its unit tests.
    fn is_internal(&self, frame: &RawFrame<'_>) -> bool {
        if frame.symbol.contains("::tests::") {
            return false;
        }
        match frame.location {
            Some(location) => self.is_own_source(source_file(location)),
            None => frame
                .symbol
                .trim_start_matches('<')
                .starts_with(CRATE_PREFIX),
        }
    }

    fn is_own_source(&self, file: &str) -> bool {
        let path = Path::new(file);
        if path.is_absolute() {
            return path.starts_with(&self.own_sources);
        }
        // files under the working directory are printed relative to it
        self.working_dir
            .as_deref()
            .is_some_and(|cwd| cwd.join(path).starts_with(&self.own_sources))
    }
}

fn render_frames(text: &str, max_frames: usize, filter: &FrameFilter) -> Vec<String> {
    parse_frames(text)
        .into_iter()
        .filter(|f| !filter.is_runtime(f))
        .skip_while(|f| filter.is_internal(f))
        .take(max_frames)
        .map(|f| match f.location {
            Some(location) => format!("{} {}", trim_column(location), f.symbol),
            None => f.symbol.to_string(),
        })
        .collect()
}

/// `src/lib.rs:12:5` -> `src/lib.rs`
fn source_file(location: &str) -> &str {
    let mut file = location;
    for _ in 0..2 {
        match file.rsplit_once(':') {
            Some((head, n)) if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) => {
                file = head
            }
            _ => break,
        }
    }
    file
}

/// `src/lib.rs:12:5` -> `src/lib.rs:12`
fn trim_column(location: &str) -> &str {
    match location.rsplit_once(':') {
        Some((head, col))
            if !col.is_empty()
                && col.bytes().all(|b| b.is_ascii_digit())
                && head.rsplit_once(':').is_some_and(|(_, line)| {
                    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
                }) =>
        {
            head
        }
        _ => location,
    }
}
