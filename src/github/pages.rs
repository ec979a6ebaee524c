// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Lazy page-by-page iteration over GitHub list endpoints
// role: github/pagination
// inputs: A page fetcher closure (1-based page numbers)
// outputs: Iterator of individual JSON entries, or the error that ended pagination
// invariants:
// - A page is only requested once the previous one is fully consumed
// - An empty page ends iteration; an error is yielded once and then iteration ends
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::error::DigestError;
use crate::github::api::{GithubApi, RepoRef};

type PageFetch<'a> = Box<dyn FnMut(u32) -> Result<Vec<serde_json::Value>, DigestError> + 'a>;

pub struct Paginated<'a> {
  fetch: PageFetch<'a>,
  next_page: u32,
  buffer: VecDeque<serde_json::Value>,
  done: bool,
}

impl<'a> Paginated<'a> {
  pub fn new<F>(fetch: F) -> Self
  where
    F: FnMut(u32) -> Result<Vec<serde_json::Value>, DigestError> + 'a,
  {
    Self { fetch: Box::new(fetch), next_page: 1, buffer: VecDeque::new(), done: false }
  }
}

impl Iterator for Paginated<'_> {
  type Item = Result<serde_json::Value, DigestError>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(v) = self.buffer.pop_front() {
      return Some(Ok(v));
    }
    if self.done {
      return None;
    }

    let page = self.next_page;
    self.next_page += 1;

    match (self.fetch)(page) {
      Ok(items) if items.is_empty() => {
        self.done = true;
        None
      }
      Ok(items) => {
        tracing::debug!(page, entries = items.len(), "fetched page");
        self.buffer.extend(items);
        self.buffer.pop_front().map(Ok)
      }
      Err(e) => {
        self.done = true;
        Some(Err(e))
      }
    }
  }
}

/// All pull requests, most recently updated first.
pub fn pull_requests<'a>(api: &'a dyn GithubApi, repo: &'a RepoRef) -> Paginated<'a> {
  Paginated::new(move |page| api.list_pulls_page(repo, page))
}

/// Issues (and pull requests) updated since `since`, most recently updated first.
pub fn issues<'a>(api: &'a dyn GithubApi, repo: &'a RepoRef, since: DateTime<Utc>) -> Paginated<'a> {
  Paginated::new(move |page| api.list_issues_page(repo, since, page))
}
