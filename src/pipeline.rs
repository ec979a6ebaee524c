// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Run the pull request and issue queries, classify what they yield, and assemble the digest lines
// role: processing/orchestrator
// inputs: GithubApi handle, DigestParams (repo, ClassifyParams, optional PR numbers, review source, sequential)
// outputs: DigestOutcome (records, rendered lines, non-fatal failures)
// side_effects: Network calls through GithubApi; tracing events
// invariants:
// - Listings are most-recently-updated first: an item updated before the window start ends that listing
// - Pull requests updated after end+buffer are skipped, not treated as the end of the listing
// - A failing query keeps the records gathered before the failure; the other query is unaffected
// - Explicit PR numbers are visited in ascending order with no listing-based skipping
// errors: Never returned; recorded per query on Harvest and surfaced as DigestOutcome::failures
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::Serialize;

use crate::classify::{ClassifyParams, classify_into};
use crate::cli::ReviewSource;
use crate::error::DigestError;
use crate::ext::serde_json::JsonFetch;
use crate::github::api::{GithubApi, RepoRef};
use crate::github::items::{is_pull_request_entry, item_from_document};
use crate::github::pages;
use crate::issues::classify_issue;
use crate::model::ClassifiedRecord;
use crate::render;
use crate::review::{ApiReviewDetector, ReviewMemo, ReviewSignalProvider, TextScanReviewDetector};
use crate::util;

const PROGRESS_EVERY: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct DigestParams {
  pub repo: RepoRef,
  pub classify: ClassifyParams,
  /// When non-empty, only these pull requests are inspected.
  pub pr_numbers: Vec<u64>,
  pub review_source: ReviewSource,
  pub sequential: bool,
}

/// What one query produced, including the error that cut it short, if any.
#[derive(Debug)]
pub struct Harvest {
  pub source: &'static str,
  pub records: Vec<ClassifiedRecord>,
  pub scanned: usize,
  pub error: Option<DigestError>,
}

impl Harvest {
  fn new(source: &'static str) -> Self {
    Self { source, records: Vec::new(), scanned: 0, error: None }
  }

  /// Keep the first failure; true when the query should stop.
  fn fail(&mut self, err: DigestError, number: Option<u64>) -> bool {
    if err.is_rate_limit() {
      tracing::warn!(source = self.source, ?number, error = %err, "rate limit hit; keeping partial results");
    } else {
      tracing::warn!(source = self.source, ?number, error = %err, "GitHub request failed");
    }
    let stop = err.stops_traversal();
    if self.error.is_none() {
      self.error = Some(err);
    }
    stop
  }

  fn tick(&mut self) {
    self.scanned += 1;
    if self.scanned % PROGRESS_EVERY == 0 {
      tracing::info!(source = self.source, scanned = self.scanned, records = self.records.len(), "progress");
    }
  }
}

#[derive(Debug)]
pub struct DigestOutcome {
  pub records: Vec<ClassifiedRecord>,
  pub lines: Vec<String>,
  pub failures: Vec<DigestError>,
}

impl DigestOutcome {
  pub fn is_partial(&self) -> bool {
    !self.failures.is_empty()
  }
}

/// Hydrate one pull request and classify it. Returns true when traversal should stop.
fn visit_pull(
  api: &dyn GithubApi,
  params: &DigestParams,
  reviews: &dyn ReviewSignalProvider,
  number: u64,
  harvest: &mut Harvest,
) -> bool {
  let doc = match api.get_pull(&params.repo, number) {
    Ok(doc) => doc,
    Err(e) => return harvest.fail(e, Some(number)),
  };
  let Some(item) = item_from_document(&doc, true) else {
    tracing::warn!(number, "pull request is missing number or timestamps; skipped");
    return false;
  };
  match classify_into(&item, &params.classify, reviews, &mut harvest.records) {
    Ok(()) => false,
    Err(e) => harvest.fail(e, Some(number)),
  }
}

pub fn collect_pull_request_records(
  api: &dyn GithubApi,
  params: &DigestParams,
  reviews: &dyn ReviewSignalProvider,
) -> Harvest {
  let mut harvest = Harvest::new("pulls");

  if !params.pr_numbers.is_empty() {
    let mut numbers = params.pr_numbers.clone();
    numbers.sort_unstable();
    tracing::info!(count = numbers.len(), "inspecting listed pull requests");
    for number in numbers {
      harvest.tick();
      if visit_pull(api, params, reviews, number, &mut harvest) {
        break;
      }
    }
    return harvest;
  }

  let window = &params.classify.window;
  tracing::info!(repo = %params.repo.slug(), "listing pull requests");
  for entry in pages::pull_requests(api, &params.repo) {
    let entry = match entry {
      Ok(v) => v,
      Err(e) => {
        harvest.fail(e, None);
        break;
      }
    };
    harvest.tick();

    let (Some(number), Some(updated_at)) = (entry.fetch("number").to::<u64>(), entry.fetch("updated_at").to_timestamp())
    else {
      continue;
    };
    if window.is_after(updated_at) {
      tracing::debug!(number, %updated_at, "updated after the window; skipped");
      continue;
    }
    if window.is_before(updated_at) {
      tracing::info!(number, %updated_at, "reached pull requests older than the window");
      break;
    }
    if visit_pull(api, params, reviews, number, &mut harvest) {
      break;
    }
  }

  harvest
}

pub fn collect_issue_records(api: &dyn GithubApi, params: &DigestParams) -> Harvest {
  let mut harvest = Harvest::new("issues");
  let window = &params.classify.window;

  tracing::info!(repo = %params.repo.slug(), since = %window.start, "listing issues");
  for entry in pages::issues(api, &params.repo, window.start) {
    let entry = match entry {
      Ok(v) => v,
      Err(e) => {
        harvest.fail(e, None);
        break;
      }
    };
    if is_pull_request_entry(&entry) {
      continue;
    }
    harvest.tick();

    let (Some(number), Some(updated_at)) = (entry.fetch("number").to::<u64>(), entry.fetch("updated_at").to_timestamp())
    else {
      continue;
    };
    if window.is_before(updated_at) {
      tracing::info!(number, %updated_at, "reached issues older than the window");
      break;
    }

    let doc = match api.get_issue(&params.repo, number) {
      Ok(doc) => doc,
      Err(e) => {
        if harvest.fail(e, Some(number)) {
          break;
        }
        continue;
      }
    };
    if let Some(record) = item_from_document(&doc, false).and_then(|issue| classify_issue(&issue, &params.classify)) {
      harvest.records.push(record);
    }
  }

  harvest
}

fn log_rate_limit(api: &dyn GithubApi, when: &'static str) {
  match api.rate_limit() {
    Ok(status) if status.is_exhausted() => {
      tracing::warn!(when, reset = status.reset_epoch, "GitHub rate limit exhausted")
    }
    Ok(status) => tracing::info!(
      when,
      remaining = status.remaining,
      limit = status.limit,
      reset = status.reset_epoch,
      "GitHub rate limit"
    ),
    Err(e) => tracing::warn!(when, error = %e, "could not read rate limit"),
  }
}

/// Run both queries (in parallel unless `sequential`), then sort, group and render.
pub fn run_digest(api: &dyn GithubApi, params: &DigestParams) -> DigestOutcome {
  log_rate_limit(api, "start");

  let detector: Box<dyn ReviewSignalProvider + '_> = match params.review_source {
    ReviewSource::Text => Box::new(TextScanReviewDetector::new(api)),
    ReviewSource::Reviews => Box::new(ApiReviewDetector::new(api, &params.repo)),
  };
  let reviews = ReviewMemo::new(detector.as_ref());

  let pulls_job = || util::timed("pull requests", || collect_pull_request_records(api, params, &reviews));
  let issues_job = || util::timed("issues", || collect_issue_records(api, params));
  let (pulls, issues) = if params.sequential {
    (pulls_job(), issues_job())
  } else {
    rayon::join(pulls_job, issues_job)
  };

  let mut records = Vec::with_capacity(pulls.records.len() + issues.records.len());
  let mut failures = Vec::new();
  for harvest in [pulls, issues] {
    tracing::info!(
      source = harvest.source,
      scanned = harvest.scanned,
      records = harvest.records.len(),
      partial = harvest.error.is_some(),
      "query finished"
    );
    records.extend(harvest.records);
    failures.extend(harvest.error);
  }

  let lines = util::timed("render", || render::render_lines(&render::sort_and_group(&records)));
  log_rate_limit(api, "end");

  DigestOutcome { records, lines, failures }
}
