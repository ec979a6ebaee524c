// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for report hashing, stage timing, and man page rendering
// role: utilities/helpers
// inputs: Paths; closures; clap CommandFactory
// outputs: sha512 hex digests, timed results, man page text
// invariants:
// - hash_file/hash_bytes are lowercase hex, 128 characters
// - timed never alters the closure's result
// errors: IO errors bubble with the path in context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::CommandFactory;
use sha2::{Digest, Sha512};

/// sha512 of `bytes` as lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
  let digest = Sha512::digest(bytes);
  let mut hex = String::with_capacity(digest.len() * 2);
  for b in digest.iter() {
    let _ = write!(hex, "{:02x}", b);
  }
  hex
}

/// sha512 of a file's contents as lowercase hex.
pub fn hash_file<P: AsRef<Path>>(path: P) -> Result<String> {
  let path = path.as_ref();
  let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
  Ok(hash_bytes(&bytes))
}

/// Run `f` and log how long it took under `label`.
pub fn timed<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
  let started = Instant::now();
  let out = f();
  tracing::info!(stage = label, elapsed_ms = started.elapsed().as_millis() as u64, "stage finished");
  out
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
