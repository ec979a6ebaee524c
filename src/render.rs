// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Sort classified records, group them by day and kind, and write the digest text
// role: rendering/digest
// inputs: Vec<ClassifiedRecord>; output path ("-" for stdout)
// outputs: DisplayLines, their text form, and the written report file
// side_effects: write_report creates parent directories and writes the file
// invariants:
// - Sort is stable: date ascending, then kind ascending, then branch label descending
// - A day header is preceded by a blank line
// - Kind groups nest under their day: every new day restarts with a kind header, even when the kind is unchanged
// - Output always ends with one blank line; lines are "\n"-terminated UTF-8
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::cmp::Ordering;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{ClassifiedRecord, DisplayLine};

fn compare_records(a: &ClassifiedRecord, b: &ClassifiedRecord) -> Ordering {
  a.timestamp
    .date_naive()
    .cmp(&b.timestamp.date_naive())
    .then_with(|| a.kind.as_str().cmp(b.kind.as_str()))
    .then_with(|| b.branch_label.cmp(&a.branch_label))
}

/// Stable in-place sort; ties keep input order.
pub fn sort_records(records: &mut [ClassifiedRecord]) {
  records.sort_by(compare_records);
}

/// Right-align titles that do not start with a six-column branch label such as `[3.10]`.
pub fn pad_title(title: &str) -> String {
  if title.chars().nth(5) == Some(']') {
    title.to_string()
  } else {
    format!(" {}", title)
  }
}

pub fn sort_and_group(records: &[ClassifiedRecord]) -> Vec<DisplayLine> {
  let mut sorted = records.to_vec();
  sort_records(&mut sorted);

  let mut lines = Vec::with_capacity(sorted.len() * 2 + 1);
  let mut current_day = None;
  let mut current_kind = None;

  for rec in &sorted {
    let day = rec.timestamp.date_naive();
    if current_day != Some(day) {
      lines.push(DisplayLine::Blank);
      lines.push(DisplayLine::Day(day.format("%A").to_string()));
      current_day = Some(day);
      current_kind = None;
    }
    if current_kind != Some(rec.kind) {
      lines.push(DisplayLine::Blank);
      lines.push(DisplayLine::Kind(rec.kind));
      current_kind = Some(rec.kind);
    }
    lines.push(DisplayLine::Item { link: rec.link.clone(), title: pad_title(&rec.title) });
  }
  lines.push(DisplayLine::Blank);

  lines
}

pub fn render_lines(lines: &[DisplayLine]) -> Vec<String> {
  lines.iter().map(|l| l.to_string()).collect()
}

/// Write `lines` newline-terminated to `out`, or to stdout when `out` is "-".
pub fn write_report(out: &str, lines: &[String]) -> Result<()> {
  let mut text = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
  for line in lines {
    text.push_str(line);
    text.push('\n');
  }

  if out == "-" {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(text.as_bytes()).context("writing digest to stdout")?;
    return Ok(());
  }

  let path = Path::new(out);
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(path, text.as_bytes()).with_context(|| format!("writing {}", path.display()))?;

  Ok(())
}
