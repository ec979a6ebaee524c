// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Error taxonomy for GitHub access and report output
// role: errors/types
// outputs: DigestError and helpers to tell fatal from best-effort failures
// invariants:
// - RateLimitExceeded and Upstream never abort a run; callers keep partial results
// - Auth is the only variant that stops a run before network traffic
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
  /// The API quota is exhausted; `reset_epoch` is when it refills (unix seconds).
  #[error("GitHub API rate limit exceeded (resets at {reset_epoch:?})")]
  RateLimitExceeded { reset_epoch: Option<i64> },

  #[error("GitHub API returned HTTP {status} for {url}")]
  Upstream { status: u16, url: String },

  #[error("request to {url} failed: {message}")]
  Transport { url: String, message: String },

  #[error("unexpected response from {url}: {message}")]
  Malformed { url: String, message: String },

  #[error("authentication failed: {0}")]
  Auth(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl DigestError {
  pub fn is_rate_limit(&self) -> bool {
    matches!(self, DigestError::RateLimitExceeded { .. })
  }

  /// Errors after which it is pointless to keep issuing requests in this run.
  pub fn stops_traversal(&self) -> bool {
    matches!(
      self,
      DigestError::RateLimitExceeded { .. } | DigestError::Auth(_) | DigestError::Transport { .. }
    )
  }
}
