//! Hudson coalescent with recombination on a discrete genome.
//!
//! Lineages carry ancestral material as half-open integer intervals mapped to
//! the node that last inherited them. Material is dropped from the simulation
//! as soon as every sample has coalesced over it, which bounds the run even
//! when recombination outpaces coalescence.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::Rng;

use crate::sampling::{exponential, rng_from_seed};
use crate::ToolError;

/// Parameters of an ancestry simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct AncestryParams {
    /// Number of sampled individuals.
    pub num_individuals: usize,
    /// Genome copies per individual.
    pub ploidy: usize,
    /// Sequence length in base pairs.
    pub sequence_length: u64,
    /// Effective population size (individuals).
    pub population_size: f64,
    /// Per-base, per-generation recombination rate.
    pub recombination_rate: f64,
    /// Random seed.
    pub seed: u64,
}

/// A node of the genealogy; sample nodes sit at time zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Time in generations before the present.
    pub time: f64,
    /// Whether this node is a sampled genome.
    pub is_sample: bool,
}

/// Parent/child relationship over the interval `[left, right)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Inclusive left coordinate.
    pub left: u64,
    /// Exclusive right coordinate.
    pub right: u64,
    /// Parent node id.
    pub parent: usize,
    /// Child node id.
    pub child: usize,
}

/// Output of an ancestry simulation: node and edge tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Genealogy {
    /// Sequence length in base pairs.
    pub sequence_length: u64,
    /// Number of sample nodes (ids `0..num_samples`).
    pub num_samples: usize,
    /// Node table.
    pub nodes: Vec<Node>,
    /// Edge table.
    pub edges: Vec<Edge>,
}

impl Genealogy {
    /// Parent of every node in the local tree at `position`.
    pub fn parents_at(&self, position: u64) -> Vec<Option<usize>> {
        let mut parents = vec![None; self.nodes.len()];
        for edge in &self.edges {
            if edge.left <= position && position < edge.right {
                parents[edge.child] = Some(edge.parent);
            }
        }
        parents
    }

    /// Root reached from each sample at `position`; all samples share one root
    /// once the simulation has completed.
    pub fn root_at(&self, position: u64, sample: usize) -> usize {
        let parents = self.parents_at(position);
        let mut node = sample;
        while let Some(parent) = parents[node] {
            node = parent;
        }
        node
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    left: u64,
    right: u64,
    node: usize,
}

type Lineage = Vec<Segment>;

fn links(lineage: &Lineage) -> u64 {
    match (lineage.first(), lineage.last()) {
        (Some(first), Some(last)) => last.right - first.left - 1,
        _ => 0,
    }
}

/// Number of lineages still carrying each stretch of the genome.
#[derive(Debug)]
struct Coverage {
    // start -> count, valid until the next key; the final key is the sequence end
    counts: BTreeMap<u64, usize>,
}

impl Coverage {
    fn new(sequence_length: u64, lineages: usize) -> Self {
        let mut counts = BTreeMap::new();
        counts.insert(0, lineages);
        counts.insert(sequence_length, 0);
        Self { counts }
    }

    fn split_at(&mut self, x: u64) {
        if self.counts.contains_key(&x) {
            return;
        }
        if let Some((_, &count)) = self.counts.range(..x).next_back() {
            self.counts.insert(x, count);
        }
    }

    /// Decrement counts over `[left, right)`, returning the sub-intervals with
    /// their new counts.
    fn decrement(&mut self, left: u64, right: u64) -> Vec<(u64, u64, usize)> {
        self.split_at(left);
        self.split_at(right);
        let keys: Vec<u64> = self.counts.range(left..=right).map(|(&k, _)| k).collect();
        let mut out = Vec::with_capacity(keys.len());
        for pair in keys.windows(2) {
            if let Some(count) = self.counts.get_mut(&pair[0]) {
                *count = count.saturating_sub(1);
                out.push((pair[0], pair[1], *count));
            }
        }
        out
    }
}

struct Simulator {
    rng: StdRng,
    time: f64,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    lineages: Vec<Lineage>,
    coverage: Coverage,
    coalescence_scale: f64,
    recombination_rate: f64,
}

/// Run the coalescent and return the resulting genealogy.
pub fn simulate_ancestry(params: &AncestryParams) -> Result<Genealogy, ToolError> {
    if params.num_individuals == 0 || params.ploidy == 0 {
        return Err(ToolError::InvalidArgument(
            "at least one sampled genome is required".to_string(),
        ));
    }
    if params.sequence_length == 0 {
        return Err(ToolError::InvalidArgument(
            "sequence length must be > 0".to_string(),
        ));
    }
    if params.population_size <= 0.0 || params.recombination_rate < 0.0 {
        return Err(ToolError::InvalidArgument(
            "population size must be > 0 and recombination rate >= 0".to_string(),
        ));
    }

    let num_samples = params.num_individuals * params.ploidy;
    let nodes = (0..num_samples)
        .map(|_| Node {
            time: 0.0,
            is_sample: true,
        })
        .collect();
    let lineages = (0..num_samples)
        .map(|node| {
            vec![Segment {
                left: 0,
                right: params.sequence_length,
                node,
            }]
        })
        .collect();

    let mut sim = Simulator {
        rng: rng_from_seed(Some(params.seed)),
        time: 0.0,
        nodes,
        edges: Vec::new(),
        lineages,
        coverage: Coverage::new(params.sequence_length, num_samples),
        // Pairwise coalescence rate is 1 / (ploidy * N) per generation.
        coalescence_scale: 1.0 / (params.ploidy as f64 * params.population_size),
        recombination_rate: params.recombination_rate,
    };
    sim.run();

    tracing::debug!(
        nodes = sim.nodes.len(),
        edges = sim.edges.len(),
        tmrca = sim.time,
        "ancestry simulation finished"
    );

    Ok(Genealogy {
        sequence_length: params.sequence_length,
        num_samples,
        nodes: sim.nodes,
        edges: sim.edges,
    })
}

impl Simulator {
    fn run(&mut self) {
        while self.lineages.len() > 1 {
            let k = self.lineages.len() as f64;
            let coalescence = k * (k - 1.0) / 2.0 * self.coalescence_scale;
            let total_links: u64 = self.lineages.iter().map(links).sum();
            let recombination = self.recombination_rate * total_links as f64;

            self.time += exponential(&mut self.rng, coalescence + recombination);
            if self.rng.gen::<f64>() * (coalescence + recombination) < recombination {
                self.recombine(total_links);
            } else {
                self.coalesce();
            }
        }
    }

    fn recombine(&mut self, total_links: u64) {
        let mut pick = self.rng.gen_range(0..total_links);
        let mut index = 0;
        for (i, lineage) in self.lineages.iter().enumerate() {
            let l = links(lineage);
            if pick < l {
                index = i;
                break;
            }
            pick -= l;
        }
        let lineage = self.lineages.swap_remove(index);
        let breakpoint = lineage[0].left + 1 + pick;

        let mut left_part = Vec::new();
        let mut right_part = Vec::new();
        for seg in lineage {
            if seg.right <= breakpoint {
                left_part.push(seg);
            } else if seg.left >= breakpoint {
                right_part.push(seg);
            } else {
                left_part.push(Segment {
                    right: breakpoint,
                    ..seg
                });
                right_part.push(Segment {
                    left: breakpoint,
                    ..seg
                });
            }
        }
        self.lineages.push(left_part);
        self.lineages.push(right_part);
    }

    fn coalesce(&mut self) {
        let n = self.lineages.len();
        let a = self.rng.gen_range(0..n);
        let mut b = self.rng.gen_range(0..n - 1);
        if b >= a {
            b += 1;
        }
        let (first, second) = if a > b { (a, b) } else { (b, a) };
        let x = self.lineages.swap_remove(first);
        let y = self.lineages.swap_remove(second);

        let merged = self.merge(&x, &y);
        if !merged.is_empty() {
            self.lineages.push(merged);
        }
    }

    fn merge(&mut self, x: &Lineage, y: &Lineage) -> Lineage {
        let mut bounds: Vec<u64> = x
            .iter()
            .chain(y.iter())
            .flat_map(|seg| [seg.left, seg.right])
            .collect();
        bounds.sort_unstable();
        bounds.dedup();

        let mut parent: Option<usize> = None;
        let mut merged: Lineage = Vec::new();
        let mut new_edges: Vec<Edge> = Vec::new();

        for window in bounds.windows(2) {
            let (left, right) = (window[0], window[1]);
            let in_x = covering(x, left);
            let in_y = covering(y, left);
            match (in_x, in_y) {
                (Some(node), None) | (None, Some(node)) => {
                    push_segment(&mut merged, Segment { left, right, node });
                }
                (Some(node_x), Some(node_y)) => {
                    let u = *parent.get_or_insert_with(|| {
                        self.nodes.push(Node {
                            time: self.time,
                            is_sample: false,
                        });
                        self.nodes.len() - 1
                    });
                    push_edge(&mut new_edges, Edge { left, right, parent: u, child: node_x });
                    push_edge(&mut new_edges, Edge { left, right, parent: u, child: node_y });
                    for (l, r, remaining) in self.coverage.decrement(left, right) {
                        if remaining > 1 {
                            push_segment(&mut merged, Segment { left: l, right: r, node: u });
                        }
                    }
                }
                (None, None) => {}
            }
        }

        new_edges.sort_by_key(|e| (e.child, e.left));
        let mut squashed: Vec<Edge> = Vec::with_capacity(new_edges.len());
        for edge in new_edges {
            push_edge(&mut squashed, edge);
        }
        self.edges.extend(squashed);
        merged
    }
}

fn covering(lineage: &Lineage, position: u64) -> Option<usize> {
    lineage
        .iter()
        .find(|seg| seg.left <= position && position < seg.right)
        .map(|seg| seg.node)
}

fn push_segment(lineage: &mut Lineage, seg: Segment) {
    if let Some(last) = lineage.last_mut() {
        if last.right == seg.left && last.node == seg.node {
            last.right = seg.right;
            return;
        }
    }
    lineage.push(seg);
}

fn push_edge(edges: &mut Vec<Edge>, edge: Edge) {
    if let Some(last) = edges.last_mut() {
        if last.right == edge.left && last.parent == edge.parent && last.child == edge.child {
            last.right = edge.right;
            return;
        }
    }
    edges.push(edge);
}
