//! # Gossip Topology
//!
//! Which participants exchange the proposals they received, by position in
//! the round's participant list. Used to cross-check a primary's
//! pre-prepares: a conflict between two neighbours exposes an equivocating
//! primary.
//!
//! | Topology | Neighbours of `i` |
//! |----------|-------------------|
//! | Mesh | everyone else |
//! | Ring | `i-1`, `i+1` (wrapping) |
//! | Star | hub `0` ↔ every leaf |
//! | Hierarchical | parent `(i-1)/fanout` and children `i*fanout+1..` |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Topology {
    #[default]
    Mesh,
    Ring,
    Star,
    Hierarchical { fanout: usize },
}

impl Topology {
    /// Neighbour indices of `index` among `n` participants, ascending.
    pub fn neighbors(&self, index: usize, n: usize) -> Vec<usize> {
        if index >= n || n < 2 {
            return Vec::new();
        }
        let mut out: Vec<usize> = match *self {
            Topology::Mesh => (0..n).filter(|&j| j != index).collect(),
            Topology::Ring => vec![(index + n - 1) % n, (index + 1) % n],
            Topology::Star if index == 0 => (1..n).collect(),
            Topology::Star => vec![0],
            Topology::Hierarchical { fanout } => {
                let fanout = fanout.max(1);
                let mut v = Vec::new();
                if index > 0 {
                    v.push((index - 1) / fanout);
                }
                let first_child = index * fanout + 1;
                v.extend((first_child..first_child + fanout).filter(|&c| c < n));
                v
            }
        };
        out.sort_unstable();
        out.dedup();
        out.retain(|&j| j != index);
        out
    }

    /// Undirected edges `(a, b)` with `a < b`.
    pub fn edges(&self, n: usize) -> Vec<(usize, usize)> {
        (0..n)
            .flat_map(|i| {
                self.neighbors(i, n)
                    .into_iter()
                    .filter(move |&j| j > i)
                    .map(move |j| (i, j))
            })
            .collect()
    }
}
