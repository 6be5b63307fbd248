//! The processor data model (C1): a named language+toolchain profile.
//!
//! A `Processor` is immutable, loaded once, and carries no behavior beyond
//! its two command-template functions. The registry that owns the static
//! table of processors lives in the `processor-registry` crate; this module
//! only defines the shape.

use std::fmt;

/// Identifier for a processor, e.g. `"c++17"`, `"python3"`.
///
/// A thin newtype rather than a bare `String` so that call sites can't
/// accidentally pass a source filename or image tag where a processor id
/// is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ProcessorId(pub String);

impl ProcessorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProcessorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProcessorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A language+toolchain profile: container image, canonical source
/// filename, whether a compile step is needed, and the two command
/// templates that parameterize it.
///
/// Command templates are plain function pointers rather than trait objects
/// or closures: every processor in the registry is a `const`-able static
/// value, and the commands are pure string formatting with no captured
/// state.
#[derive(Clone, Copy)]
pub struct Processor {
    pub id: &'static str,
    /// Container image reference, e.g. `"judge/gcc13:latest"`.
    pub image: &'static str,
    /// Filename the source is written under inside the work directory.
    pub code_filename: &'static str,
    pub needs_compile: bool,
    /// Builds the compile command for a given work directory. Empty string
    /// for interpreted languages.
    pub compile_cmd: fn(work_dir: &str) -> String,
    /// Builds the final run command: redirects stdin from `input.txt`,
    /// stdout to `output.txt`, and records elapsed wall time to
    /// `time.txt`, wrapped in a hard timeout.
    pub final_cmd: fn(work_dir: &str, timeout_sec: u64) -> String,
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("id", &self.id)
            .field("image", &self.image)
            .field("code_filename", &self.code_filename)
            .field("needs_compile", &self.needs_compile)
            .finish()
    }
}
