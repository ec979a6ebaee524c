use gh_weekly_digest::classify::ClassifyParams;
use gh_weekly_digest::cli::ReviewSource;
use gh_weekly_digest::github::api::RepoRef;
use gh_weekly_digest::github::fixture::FixtureApi;
use gh_weekly_digest::pipeline::{DigestParams, run_digest};
use gh_weekly_digest::window::ReportWindow;

#[test]
fn weekly_digest_lines_snapshot() {
  test_support::init_tracing();
  let window = ReportWindow::from_days(
    chrono::NaiveDate::from_ymd_opt(2021, 11, 15).unwrap(),
    chrono::NaiveDate::from_ymd_opt(2021, 11, 21).unwrap(),
    2,
  )
  .unwrap();
  let params = DigestParams {
    repo: RepoRef::parse("python/cpython").unwrap(),
    classify: ClassifyParams {
      targets: vec!["ambv".into()],
      bots: vec!["miss-islington".into()],
      window,
    },
    pr_numbers: vec![29653, 29664, 13580, 28722],
    review_source: ReviewSource::Text,
    sequential: false,
  };

  let outcome = run_digest(&FixtureApi::new(test_support::cpython_fixtures()), &params);

  test_support::insta_settings().bind(|| {
    insta::assert_json_snapshot!("weekly_digest", outcome.lines);
  });
}
