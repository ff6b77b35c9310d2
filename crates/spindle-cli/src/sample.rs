//! Built-in sample workload: eight processes with contrasting access shapes,
//! enough to tell the scheduling policies apart.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use spindle_core::{ProcessSpec, Step, Workload};

/// Generate the sample workload. Deterministic for a given seed and disk
/// size, so `compare` runs all policies over identical programs.
pub fn sample_workload(total_sectors: u64, seed: u64) -> Workload {
    let mut rng = StdRng::seed_from_u64(seed);
    let last = total_sectors - 1;
    let clamp = |sector: i64| -> u64 { sector.clamp(0, last as i64) as u64 };

    let mut processes = Vec::new();

    processes.push(ProcessSpec::new(
        "sequential-reader",
        (1_000..1_020).map(|s| Step::read(clamp(s))).collect(),
    ));

    processes.push(ProcessSpec::new(
        "random-access",
        (0..25)
            .map(|_| {
                let sector = rng.random_range(0..total_sectors);
                if rng.random_bool(0.5) {
                    Step::write(sector)
                } else {
                    Step::read(sector)
                }
            })
            .collect(),
    ));

    // Clustered around one spot: mostly reads, a tail of writes.
    let base = 5_000i64;
    processes.push(ProcessSpec::new(
        "local-access",
        (0..18)
            .map(|i| {
                let sector = clamp(base + rng.random_range(-30..=30));
                if i < 12 {
                    Step::read(sector)
                } else {
                    Step::write(sector)
                }
            })
            .collect(),
    ));

    processes.push(ProcessSpec::new(
        "sequential-writer",
        (2_000..2_016).map(|s| Step::write(clamp(s))).collect(),
    ));

    // Alternating between two distant areas stresses the sweep policies.
    let area1: Vec<i64> = (500..515).collect();
    let area2: Vec<i64> = (9_500..9_515).collect();
    let two_area: Vec<Step> = area1
        .iter()
        .zip(&area2)
        .flat_map(|(&a, &b)| [a, b])
        .take(20)
        .enumerate()
        .map(|(i, s)| {
            if i % 2 == 0 {
                Step::read(clamp(s))
            } else {
                Step::write(clamp(s))
            }
        })
        .collect();
    processes.push(ProcessSpec::new("two-area", two_area));

    processes.push(ProcessSpec::new(
        "reverse-sequential",
        (0..15).map(|i| Step::read(clamp(8_000 - i))).collect(),
    ));

    let mut jump = Vec::new();
    for i in 0..10i64 {
        jump.push(clamp(1_000 + i * 200));
        jump.push(clamp(9_000 - i * 200));
    }
    processes.push(ProcessSpec::new(
        "jump-pattern",
        jump.into_iter()
            .map(|sector| {
                if rng.random_bool(0.5) {
                    Step::write(sector)
                } else {
                    Step::read(sector)
                }
            })
            .collect(),
    ));

    processes.push(ProcessSpec::new(
        "repeated-access",
        [3_000u64, 3_001, 3_000, 3_002, 3_001, 3_000, 3_003, 3_002, 3_001, 3_000]
            .into_iter()
            .map(Step::read)
            .collect(),
    ));

    Workload::new(processes)
}
