use crate::classify::ClassifyParams;
use crate::cli::EffectiveConfig;
use crate::pipeline::DigestParams;

pub fn build_digest_params(cfg: &EffectiveConfig) -> DigestParams {
  DigestParams {
    repo: cfg.repo.clone(),
    classify: ClassifyParams {
      targets: cfg.users.clone(),
      bots: cfg.bots.clone(),
      window: cfg.window,
    },
    pr_numbers: cfg.prs.clone(),
    review_source: cfg.review_source,
    sequential: cfg.sequential,
  }
}
