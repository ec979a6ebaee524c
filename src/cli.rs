use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::github::api::RepoRef;
use crate::window::{ReportWindow, parse_report_date};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSource {
  /// Scan the rendered discussion page and comments for "<login> commented" and similar
  Text,
  /// Use the pull request review objects from the API
  Reviews,
}

#[derive(Parser, Debug)]
#[command(
    name = "gh-weekly-digest",
    version,
    about = "Summarize a maintainer's weekly GitHub activity as an HTML-ready list",
    long_about = None
)]
pub struct Cli {
  /// Repository as OWNER/NAME
  #[arg(long, default_value = "python/cpython")]
  pub repo: String,

  /// Login(s) whose activity is reported (repeatable or comma separated)
  #[arg(long = "user", value_delimiter = ',', default_value = "ambv")]
  pub users: Vec<String>,

  /// Automation account(s) whose merges of a user's PR count as the user's merge
  #[arg(long = "bot", value_delimiter = ',', default_value = "miss-islington")]
  pub bots: Vec<String>,

  /// First day of the report, YYYY-MM-DD (from 00:00:00 UTC)
  #[arg(long, required_unless_present = "gen_man")]
  pub start: Option<String>,

  /// Last day of the report, YYYY-MM-DD (through 23:59:59 UTC)
  #[arg(long, required_unless_present = "gen_man")]
  pub end: Option<String>,

  /// Extra days after --end still counted (late bot merges)
  #[arg(long, default_value_t = 2)]
  pub buffer_days: u32,

  /// Only inspect these pull request numbers instead of paging through all of them
  #[arg(long = "pr", value_delimiter = ',')]
  pub prs: Vec<u64>,

  /// How "reviewed" is detected
  #[arg(long, value_enum, default_value_t = ReviewSource::Text)]
  pub review_source: ReviewSource,

  /// Run the pull request and issue queries one after the other
  #[arg(long)]
  pub sequential: bool,

  /// Output file ("-" for stdout)
  #[arg(long, default_value = "GitHub_summary.txt")]
  pub out: String,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub repo: RepoRef,
  pub users: Vec<String>,
  pub bots: Vec<String>,
  pub start: NaiveDate,
  pub end: NaiveDate,
  pub window: ReportWindow,
  pub prs: Vec<u64>,
  pub review_source: ReviewSource,
  pub sequential: bool,
  pub out: String,
}

fn clean_logins(raw: Vec<String>) -> Vec<String> {
  let mut out: Vec<String> = Vec::new();
  for login in raw.into_iter().map(|l| l.trim().trim_start_matches('@').to_string()) {
    if !login.is_empty() && !out.contains(&login) {
      out.push(login);
    }
  }
  out
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let Some(repo) = RepoRef::parse(&cli.repo) else {
    bail!("--repo must look like OWNER/NAME, got {:?}", cli.repo)
  };

  let users = clean_logins(cli.users);
  if users.is_empty() {
    bail!("Provide at least one --user")
  }
  let bots = clean_logins(cli.bots);

  let (Some(raw_start), Some(raw_end)) = (cli.start.as_deref(), cli.end.as_deref()) else {
    bail!("Provide both --start and --end")
  };
  let start = parse_report_date(raw_start, "--start")?;
  let end = parse_report_date(raw_end, "--end")?;
  let window = ReportWindow::from_days(start, end, cli.buffer_days)?;

  let mut prs = cli.prs;
  prs.sort_unstable();
  prs.dedup();

  Ok(EffectiveConfig {
    repo,
    users,
    bots,
    start,
    end,
    window,
    prs,
    review_source: cli.review_source,
    sequential: cli.sequential,
    out: cli.out,
  })
}
