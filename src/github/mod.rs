// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Namespace for GitHub access (API seam, backends, pagination, item mapping)
// role: github/namespace
// outputs: Public submodules used by the review detectors and the pipeline
// invariants: Each submodule isolates external integration; classifiers never talk HTTP directly
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod api;
pub mod fixture;
pub mod items;
pub mod pages;
