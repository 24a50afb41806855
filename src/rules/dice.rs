//! 2d6 probabilities and the cluster hits table

use std::sync::OnceLock;

/// Number of 2d6 outcomes (out of 36) for each total 2..=12
const TWO_D6_WAYS: [u32; 11] = [1, 2, 3, 4, 5, 6, 5, 4, 3, 2, 1];

/// Volley sizes with a cluster table row
const CLUSTER_SIZES: [u32; 12] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 12, 15, 20];

/// Missiles that hit for each volley size and 2d6 roll (2..=12)
const CLUSTER_TABLE: [[u32; 11]; 12] = [
    [1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2],
    [1, 1, 1, 2, 2, 2, 2, 2, 3, 3, 3],
    [1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4],
    [1, 2, 2, 3, 3, 3, 3, 4, 4, 5, 5],
    [2, 2, 3, 3, 4, 4, 4, 5, 5, 6, 6],
    [2, 2, 3, 4, 4, 4, 4, 5, 6, 7, 7],
    [3, 3, 4, 4, 5, 5, 5, 6, 6, 8, 8],
    [3, 3, 4, 5, 5, 5, 5, 7, 7, 9, 9],
    [3, 3, 4, 6, 6, 6, 6, 8, 8, 10, 10],
    [4, 4, 5, 8, 8, 8, 8, 10, 10, 12, 12],
    [5, 5, 6, 9, 9, 9, 9, 12, 12, 15, 15],
    [6, 6, 9, 12, 12, 12, 12, 16, 16, 20, 20],
];

static EXPECTED_CLUSTER_HITS: OnceLock<[f64; 12]> = OnceLock::new();

/// Probability that 2d6 rolls at least `target`
pub fn odds(target: i32) -> f64 {
    if target <= 2 {
        return 1.0;
    }
    if target > 12 {
        return 0.0;
    }
    let start = (target - 2) as usize;
    let ways: u32 = TWO_D6_WAYS[start..].iter().sum();
    ways as f64 / 36.0
}

/// Probability of a 2d6 total (0 outside 2..=12)
pub fn roll_probability(total: i32) -> f64 {
    if !(2..=12).contains(&total) {
        return 0.0;
    }
    TWO_D6_WAYS[(total - 2) as usize] as f64 / 36.0
}

/// Missiles hitting for a listed volley size on a given roll
pub fn cluster_hits(size: u32, roll: i32) -> Option<u32> {
    let row = CLUSTER_SIZES.iter().position(|s| *s == size)?;
    if !(2..=12).contains(&roll) {
        return None;
    }
    Some(CLUSTER_TABLE[row][(roll - 2) as usize])
}

fn expected_hits_table() -> &'static [f64; 12] {
    EXPECTED_CLUSTER_HITS.get_or_init(|| {
        let mut out = [0.0; 12];
        for (row, slot) in out.iter_mut().enumerate() {
            *slot = CLUSTER_TABLE[row]
                .iter()
                .zip(TWO_D6_WAYS.iter())
                .map(|(hits, ways)| (*hits * *ways) as f64)
                .sum::<f64>()
                / 36.0;
        }
        out
    })
}

/// Average number of missiles that hit from a volley of `size`
///
/// Sizes without their own row are scaled from the nearest smaller listed
/// size. A single missile always hits when the attack does.
pub fn expected_cluster_hits(size: u32) -> f64 {
    if size < 2 {
        return size as f64;
    }
    let table = expected_hits_table();
    let row = CLUSTER_SIZES
        .iter()
        .rposition(|s| *s <= size)
        .unwrap_or(0);
    let listed = CLUSTER_SIZES[row];
    table[row] * size as f64 / listed as f64
}
