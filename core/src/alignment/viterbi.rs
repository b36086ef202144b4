//! Minimum-cost path search over a layered lattice.
//!
//! The lattice has `steps` layers of `states` nodes each. The caller supplies
//! the cost of entering state `next` at layer `step` from state `prev` in the
//! layer before (`None` for the first layer); returning `None` forbids the
//! transition. Ties keep the lower predecessor index and, at the end, the
//! lower final state, so earlier choices win.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Chosen state per layer.
    pub path: Vec<usize>,
    pub cost: u32,
}

pub fn decode<F>(states: usize, steps: usize, mut cost: F) -> Option<Decoded>
where
    F: FnMut(usize, Option<usize>, usize) -> Option<u32>,
{
    if steps == 0 {
        return Some(Decoded {
            path: Vec::new(),
            cost: 0,
        });
    }

    let mut best: Vec<Option<u32>> = (0..states).map(|s| cost(0, None, s)).collect();
    let mut back = vec![vec![0usize; states]; steps];

    for step in 1..steps {
        let mut next_best = vec![None; states];
        for next in 0..states {
            let mut winner: Option<(u32, usize)> = None;
            for (prev, &prev_cost) in best.iter().enumerate() {
                let Some(prev_cost) = prev_cost else { continue };
                let Some(edge) = cost(step, Some(prev), next) else {
                    continue;
                };
                let total = prev_cost.saturating_add(edge);
                if winner.is_none_or(|(w, _)| total < w) {
                    winner = Some((total, prev));
                }
            }
            if let Some((total, prev)) = winner {
                next_best[next] = Some(total);
                back[step][next] = prev;
            }
        }
        best = next_best;
    }

    let mut end: Option<(u32, usize)> = None;
    for (state, &total) in best.iter().enumerate() {
        let Some(total) = total else { continue };
        if end.is_none_or(|(w, _)| total < w) {
            end = Some((total, state));
        }
    }
    let (total, mut state) = end?;

    let mut path = vec![0; steps];
    for step in (0..steps).rev() {
        path[step] = state;
        state = back[step][state];
    }
    Some(Decoded { path, cost: total })
}
