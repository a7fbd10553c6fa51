//! Tools backed by [`Toolbox`] operations.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{json, Value};

use super::api::{parse_args, Tool};
use crate::metabolomics::PeakTableParams;
use crate::proteomics::DEFAULT_ENZYME;
use crate::{ToolError, Toolbox};

fn path_value(path: &Path) -> Value {
    Value::String(path.display().to_string())
}

/// Resolve a file from the seed repository.
#[derive(Debug, Default, Clone, Copy)]
pub struct GetSeedFilePath;

#[derive(Deserialize)]
struct SeedArgs {
    filepath: PathBuf,
}

impl Tool for GetSeedFilePath {
    fn name(&self) -> &'static str {
        "get_seed_file_path"
    }

    fn description(&self) -> &'static str {
        "Returns the full path to a file in the seed repository. Use this to get paths for reference genomes, annotations, etc."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"filepath": {"type": "string"}},
            "required": ["filepath"]
        })
    }

    fn invoke(&self, toolbox: &Toolbox, args: &Value) -> Result<Value, ToolError> {
        let args: SeedArgs = parse_args(self.name(), args)?;
        Ok(path_value(&toolbox.seed_file_path(args.filepath)?))
    }
}

/// Paired-end read simulation with `wgsim`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulateDnaReadsPaired;

#[derive(Deserialize)]
struct ReadsArgs {
    reference_fasta: PathBuf,
    #[serde(default = "default_num_reads")]
    num_reads: u64,
    #[serde(default = "default_read_mutation_rate")]
    mutation_rate: f64,
}

fn default_num_reads() -> u64 {
    1000
}

fn default_read_mutation_rate() -> f64 {
    0.001
}

impl Tool for SimulateDnaReadsPaired {
    fn name(&self) -> &'static str {
        "simulate_dna_reads_paired"
    }

    fn description(&self) -> &'static str {
        "Simulates paired-end DNA reads from a reference FASTA file using wgsim. Returns the paths to the two generated FASTQ files."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "reference_fasta": {"type": "string"},
                "num_reads": {"type": "integer", "default": 1000},
                "mutation_rate": {"type": "number", "default": 0.001}
            },
            "required": ["reference_fasta"]
        })
    }

    fn invoke(&self, toolbox: &Toolbox, args: &Value) -> Result<Value, ToolError> {
        let args: ReadsArgs = parse_args(self.name(), args)?;
        let pair = toolbox.simulate_dna_reads_paired(&args.reference_fasta, args.num_reads, args.mutation_rate)?;
        Ok(json!([path_value(&pair.r1), path_value(&pair.r2)]))
    }
}

/// Short-read alignment with `bwa mem` and `samtools`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlignReadsBwa;

#[derive(Deserialize)]
struct AlignArgs {
    reference_fasta: PathBuf,
    reads_r1_fastq: PathBuf,
    reads_r2_fastq: PathBuf,
}

impl Tool for AlignReadsBwa {
    fn name(&self) -> &'static str {
        "align_reads_bwa"
    }

    fn description(&self) -> &'static str {
        "Aligns paired-end reads to a reference with bwa mem, then sorts and indexes the BAM with samtools. Returns the sorted BAM path."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "reference_fasta": {"type": "string"},
                "reads_r1_fastq": {"type": "string"},
                "reads_r2_fastq": {"type": "string"}
            },
            "required": ["reference_fasta", "reads_r1_fastq", "reads_r2_fastq"]
        })
    }

    fn invoke(&self, toolbox: &Toolbox, args: &Value) -> Result<Value, ToolError> {
        let args: AlignArgs = parse_args(self.name(), args)?;
        let bam = toolbox.align_reads_bwa(&args.reference_fasta, &args.reads_r1_fastq, &args.reads_r2_fastq)?;
        Ok(path_value(&bam))
    }
}

/// Variant calling with `bcftools mpileup | bcftools call`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallVariantsBcftools;

#[derive(Deserialize)]
struct CallArgs {
    sorted_bam: PathBuf,
    reference_fasta: PathBuf,
}

impl Tool for CallVariantsBcftools {
    fn name(&self) -> &'static str {
        "call_variants_bcftools"
    }

    fn description(&self) -> &'static str {
        "Calls variants from a sorted BAM against a reference with bcftools. Returns the path of the compressed, indexed VCF."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sorted_bam": {"type": "string"},
                "reference_fasta": {"type": "string"}
            },
            "required": ["sorted_bam", "reference_fasta"]
        })
    }

    fn invoke(&self, toolbox: &Toolbox, args: &Value) -> Result<Value, ToolError> {
        let args: CallArgs = parse_args(self.name(), args)?;
        let vcf = toolbox.call_variants_bcftools(&args.sorted_bam, &args.reference_fasta)?;
        Ok(path_value(&vcf))
    }
}

/// Coalescent variant simulation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulateVariantsCoalescent;

#[derive(Deserialize)]
struct CoalescentArgs {
    #[serde(default = "default_sample_size")]
    sample_size: usize,
    #[serde(default = "default_length")]
    length: u64,
}

fn default_sample_size() -> usize {
    10
}

fn default_length() -> u64 {
    10_000
}

impl Tool for SimulateVariantsCoalescent {
    fn name(&self) -> &'static str {
        "simulate_variants_coalescent"
    }

    fn description(&self) -> &'static str {
        "Simulates diploid genotypes with a seeded coalescent and writes them as VCF. Returns the VCF path."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sample_size": {"type": "integer", "default": 10},
                "length": {"type": "integer", "default": 10000}
            }
        })
    }

    fn invoke(&self, toolbox: &Toolbox, args: &Value) -> Result<Value, ToolError> {
        let args: CoalescentArgs = parse_args(self.name(), args)?;
        let vcf = toolbox.simulate_variants_coalescent(args.sample_size, args.length)?;
        Ok(path_value(&vcf))
    }
}

/// Theoretical MS/MS spectra from a protein FASTA.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulateMsSpectra;

#[derive(Deserialize)]
struct SpectraArgs {
    protein_fasta: PathBuf,
    #[serde(default = "default_enzyme")]
    enzyme: String,
}

fn default_enzyme() -> String {
    DEFAULT_ENZYME.to_string()
}

impl Tool for SimulateMsSpectra {
    fn name(&self) -> &'static str {
        "simulate_ms_spectra"
    }

    fn description(&self) -> &'static str {
        "Digests proteins from a FASTA file and writes theoretical b/y ion spectra for up to 100 peptides as mzML. Returns the mzML path."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "protein_fasta": {"type": "string"},
                "enzyme": {"type": "string", "default": DEFAULT_ENZYME}
            },
            "required": ["protein_fasta"]
        })
    }

    fn invoke(&self, toolbox: &Toolbox, args: &Value) -> Result<Value, ToolError> {
        let args: SpectraArgs = parse_args(self.name(), args)?;
        let mzml = toolbox.simulate_ms_spectra(&args.protein_fasta, &args.enzyme)?;
        Ok(path_value(&mzml))
    }
}

/// Metabolomics peak-table simulation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulateMetabolomicsPeakList;

#[derive(Deserialize)]
#[serde(default)]
struct PeakListArgs {
    num_compounds: usize,
    num_samples: usize,
    noise_level: f64,
    seed: Option<u64>,
}

impl Default for PeakListArgs {
    fn default() -> Self {
        let params = PeakTableParams::default();
        Self {
            num_compounds: params.num_compounds,
            num_samples: params.num_samples,
            noise_level: params.noise_level,
            seed: params.seed,
        }
    }
}

impl Tool for SimulateMetabolomicsPeakList {
    fn name(&self) -> &'static str {
        "simulate_metabolomics_peak_list"
    }

    fn description(&self) -> &'static str {
        "Simulates an LC-MS peak table for a two-group study with noise peaks and writes it as CSV. Returns the CSV path."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "num_compounds": {"type": "integer", "default": 100},
                "num_samples": {"type": "integer", "default": 20},
                "noise_level": {"type": "number", "default": 0.1},
                "seed": {"type": ["integer", "null"]}
            }
        })
    }

    fn invoke(&self, toolbox: &Toolbox, args: &Value) -> Result<Value, ToolError> {
        let args: PeakListArgs = parse_args(self.name(), args)?;
        let csv = toolbox.simulate_metabolomics_peak_list_with(&PeakTableParams {
            num_compounds: args.num_compounds,
            num_samples: args.num_samples,
            noise_level: args.noise_level,
            seed: args.seed,
        })?;
        Ok(path_value(&csv))
    }
}
