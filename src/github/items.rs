use crate::ext::serde_json::JsonFetch;
use crate::github::api::ApiDocument;
use crate::model::{ItemState, RawItem};
use crate::window::parse_http_date;

/// Map a pull request or issue JSON object onto a RawItem.
///
/// Returns None when identity or the always-present timestamps are missing;
/// every other absent field maps to None/default so rules that need it simply do not fire.
pub fn item_from_json(v: &serde_json::Value, is_pull_request: bool) -> Option<RawItem> {
  let number = v.fetch("number").to::<u64>()?;
  let created_at = v.fetch("created_at").to_timestamp()?;
  let updated_at = v.fetch("updated_at").to_timestamp()?;

  let merged_at = v.fetch("merged_at").to_timestamp();
  // list entries carry no `merged` flag; merged_at is the only signal there
  let merged = v.fetch("merged").to::<bool>().unwrap_or(merged_at.is_some());

  Some(RawItem {
    number,
    author_login: v.fetch("user.login").to::<String>(),
    merger_login: v.fetch("merged_by.login").to::<String>(),
    closer_login: v.fetch("closed_by.login").to::<String>(),
    created_at,
    updated_at,
    closed_at: v.fetch("closed_at").to_timestamp(),
    merged_at,
    last_modified: None,
    state: ItemState::parse(&v.fetch("state").to_or_default::<String>()),
    merged: is_pull_request && merged,
    title: v.fetch("title").to_or_default::<String>(),
    base_ref: v.fetch("base.ref").to::<String>(),
    comment_count: v.fetch("comments").to_or_default::<u32>(),
    html_url: v.fetch("html_url").to_or_default::<String>(),
    api_url: v.fetch("url").to_or_default::<String>(),
    comments_url: v.fetch("comments_url").to_or_default::<String>(),
    is_pull_request,
  })
}

/// Like `item_from_json`, keeping the document's `Last-Modified` header.
pub fn item_from_document(doc: &ApiDocument, is_pull_request: bool) -> Option<RawItem> {
  let mut item = item_from_json(&doc.json, is_pull_request)?;
  item.last_modified = doc.last_modified.as_deref().and_then(parse_http_date);
  Some(item)
}

/// The issues endpoint also lists pull requests; they carry a `pull_request` object.
pub fn is_pull_request_entry(v: &serde_json::Value) -> bool {
  v.fetch("pull_request").exists()
}
