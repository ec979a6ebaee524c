use crate::classify::ClassifyParams;
use crate::model::{Action, ClassifiedRecord, ItemKind, ItemState, RawItem, branch_label, link_markup};

/// Branch label for an issue: a leading `[3.x]` token of the title, else `[main]`.
pub fn issue_branch_label(title: &str) -> String {
  title
    .split_whitespace()
    .next()
    .filter(|token| token.starts_with("[3."))
    .and_then(|token| token.split_once(']'))
    .map(|(branch, _)| branch_label(&format!("{}]", branch)))
    .unwrap_or_else(|| branch_label("main"))
}

/// Classify one (hydrated) issue: at most one record, depending on its state.
///
/// The date checked against the window is the detail response's `Last-Modified`,
/// falling back to `created_at` when the header was not available.
pub fn classify_issue(issue: &RawItem, params: &ClassifyParams) -> Option<ClassifiedRecord> {
  let date_to_consider = issue.last_modified.unwrap_or(issue.created_at);
  if !params.window.contains(Some(date_to_consider)) {
    return None;
  }

  let (action, timestamp) = match issue.state {
    ItemState::Open if params.is_target(issue.author_login.as_deref()) => (Action::Opened, issue.updated_at),
    ItemState::Closed if params.is_target(issue.closer_login.as_deref()) => (Action::Closed, issue.closed_at?),
    _ => return None,
  };

  Some(ClassifiedRecord {
    timestamp,
    kind: ItemKind::Issue,
    action,
    number: issue.number,
    branch_label: issue_branch_label(&issue.title),
    link: link_markup(action, issue.number, &issue.html_url),
    title: issue.title.trim().to_string(),
  })
}
