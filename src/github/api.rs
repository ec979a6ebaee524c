// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: GitHub REST seam: trait, HTTP backend (ureq), token discovery, rate-limit status
// role: github/api
// inputs: owner/name, page numbers, env GITHUB_ACCESS_TOKEN/GITHUB_TOKEN/GH_TOKEN; optional `gh` CLI for token fallback; env DIGEST_FIXTURES_DIR
// outputs: JSON pages, detail documents (with Last-Modified), raw page text, RateLimitStatus
// side_effects: Network calls to api.github.com and github.com; spawns `gh` subprocess when needed
// invariants:
// - Never panic; every failure maps onto a DigestError variant
// - HTTP 403/429 with an exhausted quota is RateLimitExceeded, never Upstream
// - Token discovery prefers GITHUB_ACCESS_TOKEN, then GITHUB_TOKEN, GH_TOKEN, `gh auth token`
// errors: Returned to callers, who decide between partial results and abort
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DigestError;
use crate::ext::serde_json::JsonFetch;
use crate::github::fixture::{FixtureApi, FIXTURES_ENV};

pub const API_ROOT: &str = "https://api.github.com";
pub const PER_PAGE: u32 = 100;

/// `owner/name` of the repository being reported on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
  pub owner: String,
  pub name: String,
}

impl RepoRef {
  pub fn parse(slug: &str) -> Option<RepoRef> {
    let (owner, name) = slug.trim().split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
      return None;
    }
    Some(RepoRef { owner: owner.to_string(), name: name.to_string() })
  }

  pub fn slug(&self) -> String {
    format!("{}/{}", self.owner, self.name)
  }
}

/// A single-resource response: body plus the headers the classifiers care about.
#[derive(Debug, Clone)]
pub struct ApiDocument {
  pub json: serde_json::Value,
  pub last_modified: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
  pub limit: u64,
  pub remaining: u64,
  pub reset_epoch: i64,
}

impl RateLimitStatus {
  pub fn from_json(v: &serde_json::Value) -> RateLimitStatus {
    RateLimitStatus {
      limit: v.fetch("resources.core.limit").to_or_default(),
      remaining: v.fetch("resources.core.remaining").to_or_default(),
      reset_epoch: v.fetch("resources.core.reset").to_or_default(),
    }
  }

  pub fn is_exhausted(&self) -> bool {
    self.limit > 0 && self.remaining == 0
  }
}

// --- Trait seam for GitHub API ---
pub trait GithubApi: Send + Sync {
  /// One page of `GET /repos/{o}/{r}/pulls?state=all&sort=updated&direction=desc`.
  fn list_pulls_page(&self, repo: &RepoRef, page: u32) -> Result<Vec<serde_json::Value>, DigestError>;
  /// One page of `GET /repos/{o}/{r}/issues?state=all&since=..&sort=updated&direction=desc`.
  fn list_issues_page(
    &self,
    repo: &RepoRef,
    since: DateTime<Utc>,
    page: u32,
  ) -> Result<Vec<serde_json::Value>, DigestError>;
  fn get_pull(&self, repo: &RepoRef, number: u64) -> Result<ApiDocument, DigestError>;
  fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<ApiDocument, DigestError>;
  fn list_reviews_for_pull(&self, repo: &RepoRef, number: u64) -> Result<Vec<serde_json::Value>, DigestError>;
  /// Raw body of an arbitrary URL (rendered pull request page, comments endpoint).
  fn get_text(&self, url: &str) -> Result<String, DigestError>;
  fn rate_limit(&self) -> Result<RateLimitStatus, DigestError>;
}

pub struct GithubHttpApi {
  token: String,
  agent: ureq::Agent,
}

impl GithubHttpApi {
  pub fn new(token: String) -> Self {
    let agent = ureq::AgentBuilder::new().timeout(Duration::from_secs(60)).build();
    Self { token, agent }
  }

  fn call(&self, url: &str, accept: &str) -> Result<ureq::Response, DigestError> {
    let resp = self
      .agent
      .get(url)
      .set("Accept", accept)
      .set("User-Agent", "gh-weekly-digest")
      .set("Authorization", &format!("Bearer {}", self.token))
      .call();

    match resp {
      Ok(r) => Ok(r),
      Err(ureq::Error::Status(code, r)) => {
        let remaining = r.header("x-ratelimit-remaining").and_then(|v| v.parse::<u64>().ok());
        let reset = r.header("x-ratelimit-reset").and_then(|v| v.parse::<i64>().ok());
        Err(status_error(code, remaining, reset, url))
      }
      Err(ureq::Error::Transport(t)) => Err(DigestError::Transport { url: url.to_string(), message: t.to_string() }),
    }
  }

  fn get_document(&self, url: &str) -> Result<ApiDocument, DigestError> {
    let resp = self.call(url, "application/vnd.github+json")?;
    let last_modified = resp.header("Last-Modified").map(|s| s.to_string());
    let json = resp
      .into_json::<serde_json::Value>()
      .map_err(|e| DigestError::Malformed { url: url.to_string(), message: e.to_string() })?;

    Ok(ApiDocument { json, last_modified })
  }

  fn get_array(&self, url: &str) -> Result<Vec<serde_json::Value>, DigestError> {
    match self.get_document(url)?.json {
      serde_json::Value::Array(items) => Ok(items),
      other => Err(DigestError::Malformed {
        url: url.to_string(),
        message: format!("expected a JSON array, got {}", json_kind(&other)),
      }),
    }
  }
}

impl GithubApi for GithubHttpApi {
  fn list_pulls_page(&self, repo: &RepoRef, page: u32) -> Result<Vec<serde_json::Value>, DigestError> {
    let url = format!(
      "{}/repos/{}/{}/pulls?state=all&sort=updated&direction=desc&per_page={}&page={}",
      API_ROOT, repo.owner, repo.name, PER_PAGE, page
    );
    self.get_array(&url)
  }

  fn list_issues_page(
    &self,
    repo: &RepoRef,
    since: DateTime<Utc>,
    page: u32,
  ) -> Result<Vec<serde_json::Value>, DigestError> {
    let url = format!(
      "{}/repos/{}/{}/issues?state=all&since={}&sort=updated&direction=desc&per_page={}&page={}",
      API_ROOT,
      repo.owner,
      repo.name,
      since.to_rfc3339_opts(SecondsFormat::Secs, true),
      PER_PAGE,
      page
    );
    self.get_array(&url)
  }

  fn get_pull(&self, repo: &RepoRef, number: u64) -> Result<ApiDocument, DigestError> {
    let url = format!("{}/repos/{}/{}/pulls/{}", API_ROOT, repo.owner, repo.name, number);
    self.get_document(&url)
  }

  fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<ApiDocument, DigestError> {
    let url = format!("{}/repos/{}/{}/issues/{}", API_ROOT, repo.owner, repo.name, number);
    self.get_document(&url)
  }

  fn list_reviews_for_pull(&self, repo: &RepoRef, number: u64) -> Result<Vec<serde_json::Value>, DigestError> {
    let url = format!(
      "{}/repos/{}/{}/pulls/{}/reviews?per_page={}",
      API_ROOT, repo.owner, repo.name, number, PER_PAGE
    );
    self.get_array(&url)
  }

  fn get_text(&self, url: &str) -> Result<String, DigestError> {
    let resp = self.call(url, "text/html, application/vnd.github+json")?;
    resp
      .into_string()
      .map_err(|e| DigestError::Malformed { url: url.to_string(), message: e.to_string() })
  }

  fn rate_limit(&self) -> Result<RateLimitStatus, DigestError> {
    let url = format!("{}/rate_limit", API_ROOT);
    let doc = self.get_document(&url)?;
    Ok(RateLimitStatus::from_json(&doc.json))
  }
}

/// Map a non-2xx status onto the error taxonomy.
pub fn status_error(code: u16, remaining: Option<u64>, reset_epoch: Option<i64>, url: &str) -> DigestError {
  match code {
    401 => DigestError::Auth(format!("GitHub rejected the token for {}", url)),
    429 => DigestError::RateLimitExceeded { reset_epoch },
    403 if remaining == Some(0) => DigestError::RateLimitExceeded { reset_epoch },
    _ => DigestError::Upstream { status: code, url: url.to_string() },
  }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
  match v {
    serde_json::Value::Null => "null",
    serde_json::Value::Bool(_) => "a boolean",
    serde_json::Value::Number(_) => "a number",
    serde_json::Value::String(_) => "a string",
    serde_json::Value::Array(_) => "an array",
    serde_json::Value::Object(_) => "an object",
  }
}

/// Discover a GitHub token: env vars first, then `gh auth token` if available.
pub fn get_github_token() -> Option<String> {
  for var in ["GITHUB_ACCESS_TOKEN", "GITHUB_TOKEN", "GH_TOKEN"] {
    if let Ok(t) = std::env::var(var) {
      if !t.trim().is_empty() {
        return Some(t.trim().to_string());
      }
    }
  }

  if let Ok(output) = std::process::Command::new("gh").args(["auth", "token"]).output() {
    if output.status.success() {
      let t = String::from_utf8_lossy(&output.stdout).trim().to_string();

      if !t.is_empty() {
        return Some(t);
      }
    }
  }

  None
}

/// Pick the backend for this run: fixtures when `DIGEST_FIXTURES_DIR` is set, HTTP otherwise.
///
/// The HTTP backend needs a token; without one this fails before any request is made.
pub fn make_default_api(token: Option<String>) -> Result<Box<dyn GithubApi>, DigestError> {
  if let Some(dir) = std::env::var_os(FIXTURES_ENV) {
    tracing::info!(dir = %std::path::Path::new(&dir).display(), "reading GitHub responses from fixtures");
    return Ok(Box::new(FixtureApi::new(dir)));
  }

  match token {
    Some(t) => Ok(Box::new(GithubHttpApi::new(t))),
    None => Err(DigestError::Auth(
      "no GitHub token found; set GITHUB_ACCESS_TOKEN (or GITHUB_TOKEN / GH_TOKEN) or run: gh auth login".into(),
    )),
  }
}
