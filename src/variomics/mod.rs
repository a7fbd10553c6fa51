//! Population-genetic variant simulation.
//!
//! A seeded coalescent produces the genealogy of the sampled genomes, a
//! mutation overlay turns branch lengths into variable sites, and the result is
//! written as a phased VCF. With fixed parameters and seed the output is
//! byte-for-byte reproducible.

mod ancestry;
mod mutations;
mod vcf;

pub use ancestry::{simulate_ancestry, AncestryParams, Edge, Genealogy, Node};
pub use mutations::{simulate_mutations, Mutation, Site};
pub use vcf::{render_vcf, write_vcf, VcfLayout};

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::genomics::verify_variant_file;
use crate::{ToolError, Toolbox};

/// VCF written by the coalescent simulator.
pub const COALESCENT_VCF_FILE: &str = "msprime_sim.vcf";
/// Contig name used for simulated records.
pub const CONTIG_ID: &str = "sim_contig";
/// Effective population size.
pub const POPULATION_SIZE: f64 = 10_000.0;
/// Per-base, per-generation recombination rate.
pub const RECOMBINATION_RATE: f64 = 1e-8;
/// Per-base, per-generation mutation rate.
pub const MUTATION_RATE: f64 = 1e-8;
/// Seed shared by the ancestry and mutation stages.
pub const RANDOM_SEED: u64 = 42;
/// Genome copies per sampled individual.
pub const PLOIDY: usize = 2;

/// Simulate a sample and render it as VCF text, without touching the
/// filesystem.
pub fn simulate_vcf(sample_size: usize, length: u64) -> Result<String, ToolError> {
    let (layout, sites) = simulate_sites(sample_size, length)?;
    render_vcf(&layout, &sites)
}

fn simulate_sites(sample_size: usize, length: u64) -> Result<(VcfLayout, Vec<Site>), ToolError> {
    let genealogy = simulate_ancestry(&AncestryParams {
        num_individuals: sample_size,
        ploidy: PLOIDY,
        sequence_length: length,
        population_size: POPULATION_SIZE,
        recombination_rate: RECOMBINATION_RATE,
        seed: RANDOM_SEED,
    })?;
    let sites = simulate_mutations(&genealogy, MUTATION_RATE, RANDOM_SEED)?;
    let layout = VcfLayout {
        contig_id: CONTIG_ID.to_string(),
        contig_length: length,
        num_individuals: sample_size,
        ploidy: PLOIDY,
    };
    Ok((layout, sites))
}

impl Toolbox {
    /// Simulate variants for `sample_size` diploid individuals over `length`
    /// bases and write them as plain-text VCF.
    pub fn simulate_variants_coalescent(&self, sample_size: usize, length: u64) -> Result<PathBuf, ToolError> {
        tracing::info!(sample_size, length, "simulating coalescent variants");
        let (layout, sites) = simulate_sites(sample_size, length)?;

        let dir = self.workspace().artifact_dir(
            "simulate_variants_coalescent",
            &[sample_size.to_string(), length.to_string()],
        )?;
        let vcf_path = dir.join(COALESCENT_VCF_FILE);
        let mut writer = BufWriter::new(File::create(&vcf_path)?);
        write_vcf(&mut writer, &layout, &sites)?;
        drop(writer);

        verify_variant_file(&vcf_path, false)?;
        tracing::info!(vcf = %vcf_path.display(), sites = sites.len(), "variants simulated");
        Ok(vcf_path)
    }
}
