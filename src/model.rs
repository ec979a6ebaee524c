// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the item model (raw PRs/issues, classified records, display lines) shared by classification and rendering
// role: model/types
// outputs: Serializable structs with stable field names
// invariants: RawItem is read-only after mapping; one RawItem may yield several ClassifiedRecords
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
  Open,
  Closed,
}

impl ItemState {
  pub fn parse(s: &str) -> ItemState {
    if s.eq_ignore_ascii_case("closed") {
      ItemState::Closed
    } else {
      ItemState::Open
    }
  }
}

/// Pull request or issue, as seen by the classifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
  pub number: u64,
  pub author_login: Option<String>,
  pub merger_login: Option<String>,
  pub closer_login: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub closed_at: Option<DateTime<Utc>>,
  pub merged_at: Option<DateTime<Utc>>,
  /// `Last-Modified` header of the detail response, when the item was hydrated.
  pub last_modified: Option<DateTime<Utc>>,
  pub state: ItemState,
  pub merged: bool,
  pub title: String,
  /// Base branch name; pull requests only.
  pub base_ref: Option<String>,
  pub comment_count: u32,
  pub html_url: String,
  pub api_url: String,
  pub comments_url: String,
  pub is_pull_request: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
  Issue,
  #[serde(rename = "PR")]
  Pr,
}

impl ItemKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ItemKind::Issue => "Issue",
      ItemKind::Pr => "PR",
    }
  }
}

impl fmt::Display for ItemKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
  Authored,
  Reviewed,
  Merged,
  Closed,
  Opened,
}

impl Action {
  pub fn as_str(&self) -> &'static str {
    match self {
      Action::Authored => "authored",
      Action::Reviewed => "reviewed",
      Action::Merged => "merged",
      Action::Closed => "closed",
      Action::Opened => "opened",
    }
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One reportable action on one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
  /// Date attributed to this action; which field it comes from depends on the action.
  pub timestamp: DateTime<Utc>,
  pub kind: ItemKind,
  pub action: Action,
  pub number: u64,
  /// Bracketed branch, right-aligned to six columns (e.g. " [3.9]", "[3.10]", "[main]").
  pub branch_label: String,
  pub link: String,
  pub title: String,
}

/// Anchor markup used for every list item: `<a href=URL>ACTION GH-N</a>`.
pub fn link_markup(action: Action, number: u64, permalink: &str) -> String {
  format!("<a href={}>{} GH-{}</a>", permalink, action, number)
}

/// Bracket a branch name and right-align it so `[3.9]` lines up with `[3.10]`.
pub fn branch_label(branch: &str) -> String {
  let bracketed = if branch.starts_with('[') && branch.ends_with(']') {
    branch.to_string()
  } else {
    format!("[{}]", branch)
  };
  format!("{:>6}", bracketed)
}

/// A rendered line of the digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayLine {
  Blank,
  Day(String),
  Kind(ItemKind),
  Item { link: String, title: String },
}

impl fmt::Display for DisplayLine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DisplayLine::Blank => Ok(()),
      DisplayLine::Day(day) => f.write_str(day),
      DisplayLine::Kind(kind) => f.write_str(kind.as_str()),
      DisplayLine::Item { link, title } => write!(f, "<li> {} {}</li>", link, title),
    }
  }
}
