// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Directory-backed GithubApi for offline runs and regression tests
// role: github/fixture
// inputs: env DIGEST_FIXTURES_DIR (root directory of recorded responses)
// outputs: The same shapes GithubHttpApi returns
// invariants:
// - Missing list pages are empty (end of pagination); missing text is empty
// - Missing detail documents are Upstream 404, matching the live API
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::DigestError;
use crate::github::api::{ApiDocument, GithubApi, RateLimitStatus, RepoRef};

pub const FIXTURES_ENV: &str = "DIGEST_FIXTURES_DIR";

/// Layout under `root`:
///
/// ```text
/// pulls/page-<n>.json       pulls/<number>.json      pulls/<number>-reviews.json
/// issues/page-<n>.json      issues/<number>.json     issues/<number>.last_modified
/// text/<sanitized url>.txt  rate_limit.json
/// ```
pub struct FixtureApi {
  root: PathBuf,
}

impl FixtureApi {
  pub fn new<P: AsRef<Path>>(root: P) -> Self {
    Self { root: root.as_ref().to_path_buf() }
  }

  fn read_json(&self, rel: &str) -> Result<Option<serde_json::Value>, DigestError> {
    let path = self.root.join(rel);
    if !path.exists() {
      return Ok(None);
    }
    let raw = std::fs::read_to_string(&path)?;
    serde_json::from_str(&raw)
      .map(Some)
      .map_err(|e| DigestError::Malformed { url: path.display().to_string(), message: e.to_string() })
  }

  fn read_array(&self, rel: &str) -> Result<Vec<serde_json::Value>, DigestError> {
    match self.read_json(rel)? {
      None => Ok(Vec::new()),
      Some(serde_json::Value::Array(items)) => Ok(items),
      Some(_) => Err(DigestError::Malformed {
        url: self.root.join(rel).display().to_string(),
        message: "expected a JSON array".into(),
      }),
    }
  }

  fn read_document(&self, dir: &str, number: u64) -> Result<ApiDocument, DigestError> {
    let rel = format!("{}/{}.json", dir, number);
    let json = self.read_json(&rel)?.ok_or_else(|| DigestError::Upstream {
      status: 404,
      url: self.root.join(&rel).display().to_string(),
    })?;
    let last_modified = std::fs::read_to_string(self.root.join(format!("{}/{}.last_modified", dir, number)))
      .ok()
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty());

    Ok(ApiDocument { json, last_modified })
  }
}

/// File name a URL's body is stored under: scheme dropped, separators flattened.
pub fn text_fixture_name(url: &str) -> String {
  let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
  let flat: String = without_scheme
    .trim_end_matches('/')
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
    .collect();
  format!("{}.txt", flat)
}

impl GithubApi for FixtureApi {
  fn list_pulls_page(&self, _repo: &RepoRef, page: u32) -> Result<Vec<serde_json::Value>, DigestError> {
    self.read_array(&format!("pulls/page-{}.json", page))
  }

  fn list_issues_page(
    &self,
    _repo: &RepoRef,
    _since: DateTime<Utc>,
    page: u32,
  ) -> Result<Vec<serde_json::Value>, DigestError> {
    self.read_array(&format!("issues/page-{}.json", page))
  }

  fn get_pull(&self, _repo: &RepoRef, number: u64) -> Result<ApiDocument, DigestError> {
    self.read_document("pulls", number)
  }

  fn get_issue(&self, _repo: &RepoRef, number: u64) -> Result<ApiDocument, DigestError> {
    self.read_document("issues", number)
  }

  fn list_reviews_for_pull(&self, _repo: &RepoRef, number: u64) -> Result<Vec<serde_json::Value>, DigestError> {
    self.read_array(&format!("pulls/{}-reviews.json", number))
  }

  fn get_text(&self, url: &str) -> Result<String, DigestError> {
    let path = self.root.join("text").join(text_fixture_name(url));
    if !path.exists() {
      return Ok(String::new());
    }
    Ok(std::fs::read_to_string(path)?)
  }

  fn rate_limit(&self) -> Result<RateLimitStatus, DigestError> {
    Ok(match self.read_json("rate_limit.json")? {
      Some(v) => RateLimitStatus::from_json(&v),
      None => RateLimitStatus { limit: 5000, remaining: 5000, reset_epoch: 0 },
    })
  }
}
