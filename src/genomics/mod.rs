//! Genomics tools: paired-end read simulation, short-read alignment and
//! variant calling.
//!
//! Each stage wraps an established binary (`wgsim`, `bwa`/`samtools`,
//! `bcftools`) and returns the artifact path the next stage consumes, so a
//! caller chains them as reads → alignment → variants.

mod alignment;
mod fasta;
mod io;
mod reads;
mod variants;

pub use fasta::{parse_fasta, read_fasta, FastaRecord};
pub use io::{create_bam_writer, verify_sorted_bam, verify_variant_file};
pub use reads::{ReadPair, READ_LENGTH, READ_OUTER_DISTANCE};
pub use alignment::BWA_THREADS;

/// First-mate FASTQ written by the read simulator.
pub const READS_R1_FILE: &str = "sim_reads_r1.fastq";
/// Second-mate FASTQ written by the read simulator.
pub const READS_R2_FILE: &str = "sim_reads_r2.fastq";
/// Intermediate SAM written by the aligner.
pub const ALIGNED_SAM_FILE: &str = "aligned_reads.sam";
/// Intermediate unsorted BAM written by the aligner.
pub const ALIGNED_BAM_FILE: &str = "aligned_reads.bam";
/// Sorted, indexed BAM returned by the aligner.
pub const SORTED_BAM_FILE: &str = "aligned_reads.sorted.bam";
/// Compressed VCF returned by the variant caller.
pub const VARIANTS_VCF_FILE: &str = "variants.vcf.gz";
