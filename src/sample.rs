//! Random sampling of raw statement exports, for eyeballing what a new
//! source document actually contains before wiring it into the pipeline.

use rand::seq::SliceRandom;
use rand::Rng;

/// Sample up to `number` non-blank lines from `content`, in random order.
pub fn sample_lines(content: &str, number: usize, rng: &mut impl Rng) -> Vec<String> {
    let mut lines: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    lines.shuffle(rng);
    lines.truncate(number);
    lines
}
