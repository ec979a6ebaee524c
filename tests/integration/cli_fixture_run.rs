use predicates::prelude::*;

const BIN: &str = "gh-weekly-digest";

fn week_args() -> Vec<&'static str> {
  vec!["--start", "2021-11-15", "--end", "2021-11-21", "--pr", "29653,29664,13580,28722"]
}

#[test]
fn writes_reference_digest_from_fixtures() {
  let td = test_support::tempdir();
  let out = td.path().join("GitHub_summary.txt");

  test_support::cmd_bin(BIN)
    .env(test_support::FIXTURES_ENV, test_support::cpython_fixtures())
    .env("RUST_LOG", "info")
    .args(week_args())
    .args(["--out", out.to_str().unwrap()])
    .assert()
    .success()
    .stderr(predicate::str::contains("digest written"));

  assert_eq!(
    std::fs::read_to_string(&out).unwrap(),
    std::fs::read_to_string(test_support::reference_digest_path()).unwrap()
  );
}

#[test]
fn dash_out_prints_digest_to_stdout() {
  let expected = std::fs::read_to_string(test_support::reference_digest_path()).unwrap();

  test_support::cmd_bin(BIN)
    .env(test_support::FIXTURES_ENV, test_support::cpython_fixtures())
    .args(week_args())
    .args(["--out", "-", "--sequential"])
    .assert()
    .success()
    .stdout(predicate::eq(expected));
}

#[test]
fn missing_token_fails_before_any_request() {
  let td = test_support::tempdir();
  let out = td.path().join("GitHub_summary.txt");

  // empty PATH keeps `gh auth token` from supplying a developer token
  test_support::cmd_bin(BIN)
    .env("PATH", td.path())
    .args(week_args())
    .args(["--out", out.to_str().unwrap()])
    .assert()
    .failure()
    .stderr(predicate::str::contains("GITHUB_ACCESS_TOKEN"));

  assert!(!out.exists());
}

#[test]
fn reversed_window_is_rejected() {
  test_support::cmd_bin(BIN)
    .env(test_support::FIXTURES_ENV, test_support::cpython_fixtures())
    .args(["--start", "2021-11-21", "--end", "2021-11-15", "--out", "-"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("before --start"));
}
