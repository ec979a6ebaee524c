use clap::Parser;
use serial_test::serial;

use gh_weekly_digest::cli::{Cli, normalize};
use gh_weekly_digest::github::api::make_default_api;
use gh_weekly_digest::github::fixture::FixtureApi;
use gh_weekly_digest::params::build_digest_params;
use gh_weekly_digest::{pipeline, render, util};

/// sha512 of tests/fixtures/reference/GitHub_summary.txt
const REFERENCE_SHA512: &str = "41bd2d8517fc6218166bdad665cfbb6520c94c48d59ddd6f5037dd87c9c929b1\
                                e31eef04b2315a37864b9ec2e7ade71a37ce0a2417defe0a27235098532571bf";

fn week_of_2021_11_15(extra: &[&str], out: &str) -> Cli {
  let mut args = vec![
    "gh-weekly-digest",
    "--repo",
    "python/cpython",
    "--user",
    "ambv",
    "--start",
    "2021-11-15",
    "--end",
    "2021-11-21",
    "--out",
    out,
  ];
  args.extend_from_slice(extra);
  Cli::try_parse_from(args).unwrap()
}

fn write_digest(cli: Cli) -> (tempfile::TempDir, std::path::PathBuf, pipeline::DigestOutcome) {
  test_support::init_tracing();
  let td = test_support::tempdir();
  let cfg = normalize(cli).unwrap();
  let api = FixtureApi::new(test_support::cpython_fixtures());
  let outcome = pipeline::run_digest(&api, &build_digest_params(&cfg));
  let path = td.path().join("GitHub_summary.txt");
  render::write_report(path.to_str().unwrap(), &outcome.lines).unwrap();
  (td, path, outcome)
}

#[test]
fn reference_artifact_hash_is_pinned() {
  assert_eq!(util::hash_file(test_support::reference_digest_path()).unwrap(), REFERENCE_SHA512);
}

#[test]
fn listed_pull_requests_match_reference_digest() {
  let cli = week_of_2021_11_15(&["--pr", "29653,29664,13580,28722"], "unused");
  let (_td, path, outcome) = write_digest(cli);

  assert!(!outcome.is_partial(), "failures: {:?}", outcome.failures);
  assert_eq!(outcome.records.len(), 8);
  assert_eq!(util::hash_file(&path).unwrap(), REFERENCE_SHA512);
  assert_eq!(
    std::fs::read_to_string(&path).unwrap(),
    std::fs::read_to_string(test_support::reference_digest_path()).unwrap()
  );
}

#[test]
fn paged_listing_produces_the_same_digest() {
  let cli = week_of_2021_11_15(&["--sequential"], "unused");
  let (_td, path, outcome) = write_digest(cli);

  assert!(!outcome.is_partial(), "failures: {:?}", outcome.failures);
  assert_eq!(util::hash_file(&path).unwrap(), REFERENCE_SHA512);
}

#[test]
fn structured_reviews_without_review_objects_drop_reviewed_lines() {
  let cli = week_of_2021_11_15(&["--pr", "29653,29664,13580,28722", "--review-source", "reviews"], "unused");
  let (_td, _path, outcome) = write_digest(cli);

  assert!(!outcome.is_partial());
  assert_eq!(outcome.records.len(), 6);
  assert!(outcome.lines.iter().all(|l| !l.contains("reviewed GH-")));
}

#[test]
#[serial]
fn fixture_env_selects_recorded_backend() {
  let dir = test_support::cpython_fixtures();
  let _env = test_support::with_env(&[(test_support::FIXTURES_ENV, dir.to_str().unwrap())]);
  let api = make_default_api(None).unwrap();
  let status = api.rate_limit().unwrap();
  assert_eq!(status.remaining, 4987);
  assert_eq!(status.limit, 5000);
}

#[test]
fn recorded_backport_classifies_as_single_merge() {
  use gh_weekly_digest::classify::classify;
  use gh_weekly_digest::github::items::item_from_json;
  use gh_weekly_digest::model::Action;
  use gh_weekly_digest::review::TextScanReviewDetector;

  let json: serde_json::Value = test_support::read_fixture_json("cpython/pulls/29653.json");
  let item = item_from_json(&json, true).unwrap();
  let cfg = normalize(week_of_2021_11_15(&[], "-")).unwrap();
  let params = build_digest_params(&cfg);
  let api = FixtureApi::new(test_support::cpython_fixtures());

  let records = classify(&item, &params.classify, &TextScanReviewDetector::new(&api)).unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].action, Action::Merged);
  assert_eq!(records[0].timestamp.to_rfc3339(), "2021-11-19T17:00:00+00:00");
}

#[test]
fn recorded_timeline_text_carries_review_marker() {
  use gh_weekly_digest::review::TextScanReviewDetector;

  let text = test_support::read_fixture_text("cpython/text/github.com_python_cpython_pull_13580.txt");
  let api = FixtureApi::new(test_support::cpython_fixtures());
  let (hits, pass) = TextScanReviewDetector::new(&api).count_matches(&text, &["ambv".to_string()]);
  assert!(hits >= 1);
  assert_eq!(pass, "near");
}
