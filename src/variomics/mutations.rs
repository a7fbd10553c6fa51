//! Mutation overlay: Poisson mutations along genealogy edges under a
//! Jukes–Cantor nucleotide model, reduced to per-site sample genotypes.

use std::collections::BTreeMap;

use rand::Rng;

use super::ancestry::Genealogy;
use crate::sampling::{poisson, rng_from_seed, uniform};
use crate::ToolError;

const NUCLEOTIDES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// A mutation placed above `node` at `time`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    /// Node directly below the mutation.
    pub node: usize,
    /// Time in generations before the present.
    pub time: f64,
    /// Nucleotide after the mutation.
    pub derived_state: u8,
}

/// A variable site with its mutations and per-sample allele indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// 0-based position on the sequence.
    pub position: u64,
    /// Nucleotide at the root of the local tree.
    pub ancestral_state: u8,
    /// Mutations at this site, oldest first.
    pub mutations: Vec<Mutation>,
    /// Alleles: ancestral first, then distinct derived states.
    pub alleles: Vec<u8>,
    /// Allele index carried by each sample node.
    pub genotypes: Vec<usize>,
}

/// Place mutations at `rate` per base per generation on `genealogy`.
///
/// Sites whose mutations all revert to the ancestral state are dropped.
pub fn simulate_mutations(genealogy: &Genealogy, rate: f64, seed: u64) -> Result<Vec<Site>, ToolError> {
    if rate < 0.0 {
        return Err(ToolError::InvalidArgument(format!(
            "mutation rate {rate} must be >= 0"
        )));
    }
    let mut rng = rng_from_seed(Some(seed));

    let mut by_position: BTreeMap<u64, Vec<(usize, f64)>> = BTreeMap::new();
    for edge in &genealogy.edges {
        let top = genealogy.nodes[edge.parent].time;
        let bottom = genealogy.nodes[edge.child].time;
        let mean = rate * (edge.right - edge.left) as f64 * (top - bottom);
        for _ in 0..poisson(&mut rng, mean) {
            let position = rng.gen_range(edge.left..edge.right);
            let time = uniform(&mut rng, bottom, top);
            by_position.entry(position).or_default().push((edge.child, time));
        }
    }

    let mut sites = Vec::with_capacity(by_position.len());
    for (position, mut placed) in by_position {
        placed.sort_by(|a, b| b.1.total_cmp(&a.1));
        let parents = genealogy.parents_at(position);
        let ancestral_state = NUCLEOTIDES[rng.gen_range(0..NUCLEOTIDES.len())];

        let mut mutations: Vec<Mutation> = Vec::with_capacity(placed.len());
        for (node, time) in placed {
            let inherited = state_above(&mutations, &parents, node, time).unwrap_or(ancestral_state);
            let derived_state = mutate(&mut rng, inherited);
            mutations.push(Mutation {
                node,
                time,
                derived_state,
            });
        }

        let mut alleles = vec![ancestral_state];
        for m in &mutations {
            if !alleles.contains(&m.derived_state) {
                alleles.push(m.derived_state);
            }
        }

        let genotypes: Vec<usize> = (0..genealogy.num_samples)
            .map(|sample| {
                let state = state_above(&mutations, &parents, sample, f64::NEG_INFINITY)
                    .unwrap_or(ancestral_state);
                alleles.iter().position(|&a| a == state).unwrap_or(0)
            })
            .collect();

        if genotypes.iter().all(|&g| g == 0) {
            continue;
        }
        sites.push(Site {
            position,
            ancestral_state,
            mutations,
            alleles,
            genotypes,
        });
    }
    Ok(sites)
}

/// State set by the nearest mutation above `time` on the path from `node` to
/// the root, if any.
fn state_above(mutations: &[Mutation], parents: &[Option<usize>], node: usize, time: f64) -> Option<u8> {
    let mut current = Some(node);
    let mut floor = time;
    while let Some(v) = current {
        let nearest = mutations
            .iter()
            .filter(|m| m.node == v && m.time > floor)
            .min_by(|a, b| a.time.total_cmp(&b.time));
        if let Some(m) = nearest {
            return Some(m.derived_state);
        }
        floor = f64::NEG_INFINITY;
        current = parents[v];
    }
    None
}

fn mutate<R: Rng + ?Sized>(rng: &mut R, from: u8) -> u8 {
    let choices: Vec<u8> = NUCLEOTIDES.iter().copied().filter(|&b| b != from).collect();
    choices[rng.gen_range(0..choices.len())]
}
