// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn one pull request into zero or more classified records (merged, authored, closed, reviewed)
// role: classification/pull_requests
// inputs: RawItem (hydrated PR), ClassifyParams (targets, bots, window), ReviewSignalProvider
// outputs: ClassifiedRecords appended in rule order
// invariants:
// - Rules are independent; each firing rule appends exactly one record
// - A rule whose required field is absent does not fire
// - The review provider is only consulted when the item has comments and was updated in-window
// - Title branch prefixing is idempotent
// errors: Only review lookups can fail; records from earlier rules are kept in `out`
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DigestError;
use crate::model::{Action, ClassifiedRecord, ItemKind, ItemState, RawItem, branch_label, link_markup};
use crate::review::ReviewSignalProvider;
use crate::window::ReportWindow;

#[derive(Debug, Clone, Serialize)]
pub struct ClassifyParams {
  /// Logins whose activity is reported.
  pub targets: Vec<String>,
  /// Automation accounts whose merges of a target's PR count as the target's.
  pub bots: Vec<String>,
  pub window: ReportWindow,
}

impl ClassifyParams {
  pub fn is_target(&self, login: Option<&str>) -> bool {
    login.is_some_and(|l| self.targets.iter().any(|t| t == l))
  }

  pub fn is_bot(&self, login: Option<&str>) -> bool {
    login.is_some_and(|l| self.bots.iter().any(|b| b == l))
  }
}

/// Prefix `[base]` unless already present and drop the `(GH-<number>)` self reference.
pub fn friendly_title(title: &str, base: &str, number: u64) -> String {
  let label = format!("[{}]", base);
  let mut out = title.trim().to_string();
  if !out.contains(&label) {
    out = format!("{} {}", label, out);
  }
  out = out.replace(&format!("(GH-{})", number), "");
  out.trim_end().to_string()
}

/// Apply every pull request rule to `item`, appending to `out`.
pub fn classify_into(
  item: &RawItem,
  params: &ClassifyParams,
  reviews: &dyn ReviewSignalProvider,
  out: &mut Vec<ClassifiedRecord>,
) -> Result<(), DigestError> {
  let window = &params.window;
  let base = item.base_ref.as_deref().unwrap_or("main");
  let title = friendly_title(&item.title, base, item.number);
  let record = |action: Action, timestamp: DateTime<Utc>| ClassifiedRecord {
    timestamp,
    kind: ItemKind::Pr,
    action,
    number: item.number,
    branch_label: branch_label(base),
    link: link_markup(action, item.number, &item.html_url),
    title: title.clone(),
  };

  let merger = item.merger_login.as_deref();
  if item.state == ItemState::Closed
    && item.merged
    && window.contains(item.merged_at)
    && (params.is_target(merger) || (params.is_target(item.author_login.as_deref()) && params.is_bot(merger)))
  {
    if let Some(ts) = item.merged_at {
      out.push(record(Action::Merged, ts));
    }
  }

  if params.is_target(item.author_login.as_deref()) && window.contains(Some(item.created_at)) {
    out.push(record(Action::Authored, item.updated_at));
  }

  if !item.merged && window.contains(item.closed_at) {
    if let Some(ts) = item.closed_at {
      out.push(record(Action::Closed, ts));
    }
  }

  if window.contains(Some(item.updated_at))
    && item.comment_count >= 1
    && reviews.wrote_review(item, &params.targets)?
  {
    out.push(record(Action::Reviewed, item.updated_at));
  }

  Ok(())
}

pub fn classify(
  item: &RawItem,
  params: &ClassifyParams,
  reviews: &dyn ReviewSignalProvider,
) -> Result<Vec<ClassifiedRecord>, DigestError> {
  let mut out = Vec::new();
  classify_into(item, params, reviews, &mut out)?;
  Ok(out)
}
