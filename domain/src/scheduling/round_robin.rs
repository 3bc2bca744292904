//! Circle-method round-robin schedule

use super::pair::PairKey;

/// Build a round-robin schedule where every agent meets every other agent
/// exactly once and nobody appears twice in the same round.
///
/// With an odd number of agents a bye slot is added; whoever is paired with
/// the bye sits the round out.
pub fn build_schedule(names: &[String]) -> Vec<Vec<PairKey>> {
    if names.len() < 2 {
        return Vec::new();
    }

    let mut slots: Vec<Option<&str>> = names.iter().map(|n| Some(n.as_str())).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }

    let n = slots.len();
    let half = n / 2;
    let fixed = slots[0];
    let mut others: Vec<Option<&str>> = slots[1..].to_vec();
    let mut rounds = Vec::with_capacity(n - 1);

    for _ in 0..n - 1 {
        let left = std::iter::once(fixed).chain(others[..half - 1].iter().copied());
        let right = others[half - 1..].iter().rev().copied();

        let round: Vec<PairKey> = left
            .zip(right)
            .filter_map(|pair| match pair {
                (Some(a), Some(b)) => PairKey::new(a, b).ok(),
                _ => None,
            })
            .collect();
        rounds.push(round);

        others.rotate_right(1);
    }

    rounds
}
