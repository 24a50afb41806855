//! Heat-constrained weapon selection
//!
//! Choosing which weapons to fire is a 0/1 knapsack: heat is the weight,
//! expected damage the value, the heat ceiling the capacity. Heatless
//! weapons with any expected damage are always fired and never enter the
//! table. When two subsets tie, the one built from earlier inputs wins:
//! a later shot only displaces a table entry when it is strictly better.

use crate::combat::WeaponShot;
use crate::firing::plan::FiringPlan;

/// DP table for one 0/1 knapsack
struct KnapsackTable {
    weights: Vec<usize>,
    /// best[i][h]: best value from the first i items within heat h
    best: Vec<Vec<f64>>,
    take: Vec<Vec<bool>>,
}

impl KnapsackTable {
    fn build(items: &[(usize, f64)], capacity: usize) -> Self {
        let n = items.len();
        let mut best = vec![vec![0.0; capacity + 1]; n + 1];
        let mut take = vec![vec![false; capacity + 1]; n + 1];

        for i in 1..=n {
            let (weight, value) = items[i - 1];
            for h in 0..=capacity {
                best[i][h] = best[i - 1][h];
                if weight <= h {
                    let candidate = best[i - 1][h - weight] + value;
                    if candidate > best[i][h] {
                        best[i][h] = candidate;
                        take[i][h] = true;
                    }
                }
            }
        }

        Self {
            weights: items.iter().map(|(w, _)| *w).collect(),
            best,
            take,
        }
    }

    fn capacity(&self) -> usize {
        self.best[0].len() - 1
    }

    /// Best value within the full capacity
    fn value(&self) -> f64 {
        self.best[self.weights.len()][self.capacity()]
    }

    /// Item indices of the best subset within the full capacity, ascending
    fn selection(&self) -> Vec<usize> {
        let mut h = self.capacity();
        let mut chosen = Vec::new();
        for i in (1..=self.weights.len()).rev() {
            if self.take[i][h] {
                chosen.push(i - 1);
                h -= self.weights[i - 1];
            }
        }
        chosen.reverse();
        chosen
    }
}

/// Split into always-fired heatless shots and knapsack candidates
fn partition(shots: &[WeaponShot], capacity: usize) -> (Vec<&WeaponShot>, Vec<&WeaponShot>) {
    let mut free = Vec::new();
    let mut heated = Vec::new();
    for shot in shots.iter().filter(|s| s.is_useful()) {
        if shot.heat <= 0 {
            free.push(shot);
        } else if shot.heat as usize <= capacity {
            heated.push(shot);
        }
    }
    (free, heated)
}

/// Best set of shots whose heat stays within `heat_ceiling`
pub fn optimize(shots: Vec<WeaponShot>, heat_ceiling: i32) -> FiringPlan {
    let ceiling = heat_ceiling.max(0);
    let capacity = ceiling as usize;
    let (free, heated) = partition(&shots, capacity);

    let mut chosen: Vec<WeaponShot> = free.into_iter().cloned().collect();
    if !heated.is_empty() {
        let items: Vec<(usize, f64)> = heated
            .iter()
            .map(|s| (s.heat as usize, s.expected_damage))
            .collect();
        let table = KnapsackTable::build(&items, capacity);
        if table.value() > 0.0 {
            chosen.extend(table.selection().into_iter().map(|i| heated[i].clone()));
        }
    }
    FiringPlan::from_shots(chosen, ceiling)
}

/// Knapsack over firing arcs for platforms whose arcs share a heat budget
///
/// Each arc first picks its best volley within `arc_heat_cap`. A volley is
/// then fired whole or not at all: the outer table treats volleys as items
/// weighing their heat and worth their expected damage, within
/// `heat_ceiling`. Earlier arcs win ties.
pub fn optimize_arcs(arcs: Vec<Vec<WeaponShot>>, arc_heat_cap: i32, heat_ceiling: i32) -> FiringPlan {
    let ceiling = heat_ceiling.max(0);
    let capacity = ceiling as usize;

    let volleys: Vec<FiringPlan> = arcs
        .into_iter()
        .map(|arc| optimize(arc, arc_heat_cap.min(ceiling)))
        .filter(|volley| !volley.is_empty())
        .collect();
    let items: Vec<(usize, f64)> = volleys
        .iter()
        .map(|v| (v.heat_used as usize, v.expected_damage))
        .collect();
    let table = KnapsackTable::build(&items, capacity);

    let chosen: Vec<WeaponShot> = table
        .selection()
        .into_iter()
        .flat_map(|i| volleys[i].shots.iter().cloned())
        .collect();
    FiringPlan::from_shots(chosen, ceiling)
}
