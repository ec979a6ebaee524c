use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gh_weekly_digest::cli::{Cli, normalize};
use gh_weekly_digest::github::api::{get_github_token, make_default_api};
use gh_weekly_digest::params::build_digest_params;
use gh_weekly_digest::{pipeline, render, util};

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  init_tracing();

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;

  // Phase 2: pick the backend; a missing token stops here, before any request
  let api = make_default_api(get_github_token()).context("cannot reach GitHub")?;

  // Phase 3: query, classify, render
  let params = build_digest_params(&cfg);
  tracing::info!(
    repo = %params.repo.slug(),
    start = %cfg.start,
    end = %cfg.end,
    buffer_days = cfg.window.buffer_days,
    users = ?params.classify.targets,
    "building digest"
  );
  let outcome = pipeline::run_digest(api.as_ref(), &params);
  if outcome.is_partial() {
    tracing::warn!(failures = outcome.failures.len(), "digest is partial; see warnings above");
  }

  // Phase 4: write
  render::write_report(&cfg.out, &outcome.lines)?;
  if cfg.out != "-" {
    let digest = util::hash_file(&cfg.out)?;
    tracing::info!(path = %cfg.out, lines = outcome.lines.len(), records = outcome.records.len(), sha512 = %digest, "digest written");
  }

  Ok(())
}
