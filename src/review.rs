// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Decide whether a target login reviewed/commented on a pull request or issue
// role: review/detection
// inputs: RawItem (permalink, comments URL, number), target logins, GithubApi handle
// outputs: bool per item; memoized per item number when wrapped in ReviewMemo
// side_effects: Network calls through GithubApi (one or two per inspected item)
// invariants:
// - Items reporting zero comments never reach the network
// - Two passes: exact "<login> <marker>" then a bounded-distance regex (up to 3 tokens between)
// - Errors are never memoized; a later call retries
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::DigestError;
use crate::ext::serde_json::JsonFetch;
use crate::github::api::{GithubApi, RepoRef};
use crate::model::RawItem;

/// Phrases GitHub renders right after the acting login in a discussion timeline.
pub const REVIEW_MARKERS: [&str; 4] = ["approved these changes", "left a comment", "commented", "closed this"];

static MARKER_ALTERNATION: Lazy<String> = Lazy::new(|| {
  REVIEW_MARKERS
    .iter()
    .map(|m| regex::escape(m))
    .collect::<Vec<_>>()
    .join("|")
});

/// Capability the activity classifier uses for its "reviewed" rule.
pub trait ReviewSignalProvider: Send + Sync {
  fn wrote_review(&self, item: &RawItem, logins: &[String]) -> Result<bool, DigestError>;
}

/// Heuristic detector scanning the rendered discussion page and the comments endpoint.
pub struct TextScanReviewDetector<'a> {
  api: &'a dyn GithubApi,
  patterns: Mutex<HashMap<String, Regex>>,
}

impl<'a> TextScanReviewDetector<'a> {
  pub fn new(api: &'a dyn GithubApi) -> Self {
    Self { api, patterns: Mutex::new(HashMap::new()) }
  }

  fn pattern_for(&self, login: &str) -> Option<Regex> {
    let mut cache = self.patterns.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(re) = cache.get(login) {
      return Some(re.clone());
    }
    let re = Regex::new(&format!(
      r"\b({})\W+(?:\w+\W+){{0,3}}?({})\b",
      regex::escape(login),
      MARKER_ALTERNATION.as_str()
    ))
    .ok()?;
    cache.insert(login.to_string(), re.clone());
    Some(re)
  }

  /// Count login/marker matches in `text`: exact phrases first, then the looser regex.
  pub fn count_matches(&self, text: &str, logins: &[String]) -> (usize, &'static str) {
    let exact: usize = logins
      .iter()
      .flat_map(|login| REVIEW_MARKERS.iter().map(move |m| format!("{} {}", login, m)))
      .map(|phrase| text.matches(phrase.as_str()).count())
      .sum();
    if exact > 0 {
      return (exact, "exact");
    }

    let near: usize = logins
      .iter()
      .filter_map(|login| self.pattern_for(login))
      .map(|re| re.find_iter(text).count())
      .sum();
    (near, "near")
  }
}

impl ReviewSignalProvider for TextScanReviewDetector<'_> {
  fn wrote_review(&self, item: &RawItem, logins: &[String]) -> Result<bool, DigestError> {
    if item.comment_count == 0 || logins.is_empty() {
      return Ok(false);
    }

    let mut text = String::new();
    if !item.html_url.is_empty() {
      text.push_str(&self.api.get_text(&item.html_url)?);
    }
    if !item.comments_url.is_empty() {
      text.push('\n');
      text.push_str(&self.api.get_text(&item.comments_url)?);
    }

    let (hits, pass) = self.count_matches(&text, logins);
    if hits > 0 {
      tracing::debug!(number = item.number, hits, pass, "review signal found");
    }
    Ok(hits > 0)
  }
}

/// Detector based on the structured pull request reviews endpoint.
pub struct ApiReviewDetector<'a> {
  api: &'a dyn GithubApi,
  repo: &'a RepoRef,
}

impl<'a> ApiReviewDetector<'a> {
  pub fn new(api: &'a dyn GithubApi, repo: &'a RepoRef) -> Self {
    Self { api, repo }
  }
}

impl ReviewSignalProvider for ApiReviewDetector<'_> {
  fn wrote_review(&self, item: &RawItem, logins: &[String]) -> Result<bool, DigestError> {
    if !item.is_pull_request || item.comment_count == 0 {
      return Ok(false);
    }
    let reviews = self.api.list_reviews_for_pull(self.repo, item.number)?;
    let found = reviews.iter().any(|r| {
      r.fetch("user.login")
        .to::<String>()
        .map(|login| logins.iter().any(|l| *l == login))
        .unwrap_or(false)
    });
    if found {
      tracing::debug!(number = item.number, reviews = reviews.len(), "review object by target login");
    }
    Ok(found)
  }
}

/// Per-item memo in front of another provider.
pub struct ReviewMemo<'a> {
  inner: &'a dyn ReviewSignalProvider,
  seen: Mutex<HashMap<u64, bool>>,
}

impl<'a> ReviewMemo<'a> {
  pub fn new(inner: &'a dyn ReviewSignalProvider) -> Self {
    Self { inner, seen: Mutex::new(HashMap::new()) }
  }
}

impl ReviewSignalProvider for ReviewMemo<'_> {
  fn wrote_review(&self, item: &RawItem, logins: &[String]) -> Result<bool, DigestError> {
    if let Some(hit) = self.seen.lock().unwrap_or_else(|e| e.into_inner()).get(&item.number) {
      return Ok(*hit);
    }
    let hit = self.inner.wrote_review(item, logins)?;
    self.seen.lock().unwrap_or_else(|e| e.into_inner()).insert(item.number, hit);
    Ok(hit)
  }
}
