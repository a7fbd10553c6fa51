use std::fs;
use std::path::{Path, PathBuf};

use crate::process::ToolCommand;
use crate::{require_input, ToolError, Toolbox};

use super::io::{verify_sorted_bam, with_suffix};
use super::{ALIGNED_BAM_FILE, ALIGNED_SAM_FILE, SORTED_BAM_FILE};

/// Worker threads handed to `bwa mem -t`.
pub const BWA_THREADS: u32 = 4;

impl Toolbox {
    /// Align a read pair against `reference_fasta` and return a sorted,
    /// indexed BAM.
    ///
    /// The bwa index is built once per reference (`<ref>.bwt` marks it). The
    /// intermediate SAM and unsorted BAM are removed after a successful run;
    /// they are left behind when a stage fails.
    pub fn align_reads_bwa(
        &self,
        reference_fasta: &Path,
        reads_r1_fastq: &Path,
        reads_r2_fastq: &Path,
    ) -> Result<PathBuf, ToolError> {
        require_input(reference_fasta)?;
        require_input(reads_r1_fastq)?;
        require_input(reads_r2_fastq)?;
        tracing::info!(
            reference = %reference_fasta.display(),
            r1 = %reads_r1_fastq.display(),
            r2 = %reads_r2_fastq.display(),
            "aligning reads"
        );

        self.ensure_bwa_index(reference_fasta)?;

        let dir = self.workspace().artifact_dir(
            "align_reads_bwa",
            &[
                reference_fasta.display().to_string(),
                reads_r1_fastq.display().to_string(),
                reads_r2_fastq.display().to_string(),
            ],
        )?;
        let sam_path = dir.join(ALIGNED_SAM_FILE);
        let bam_path = dir.join(ALIGNED_BAM_FILE);
        let sorted_bam_path = dir.join(SORTED_BAM_FILE);

        let stages = alignment_stages(
            reference_fasta,
            reads_r1_fastq,
            reads_r2_fastq,
            &sam_path,
            &bam_path,
            &sorted_bam_path,
        );
        for stage in stages {
            match stage {
                Stage::ToFile(cmd, dest) => self.runner().run_to_file(&cmd, &dest)?,
                Stage::Plain(cmd) => {
                    self.runner().run(&cmd)?;
                }
            }
        }

        verify_sorted_bam(&sorted_bam_path)?;
        fs::remove_file(&sam_path)?;
        fs::remove_file(&bam_path)?;

        tracing::info!(bam = %sorted_bam_path.display(), "reads aligned");
        Ok(sorted_bam_path)
    }

    fn ensure_bwa_index(&self, reference_fasta: &Path) -> Result<(), ToolError> {
        if with_suffix(reference_fasta, ".bwt").exists() {
            tracing::debug!(reference = %reference_fasta.display(), "bwa index present");
            return Ok(());
        }
        tracing::info!(reference = %reference_fasta.display(), "indexing reference fasta");
        self.runner()
            .run(&ToolCommand::new("bwa").arg("index").arg(reference_fasta))?;
        Ok(())
    }
}

#[derive(Debug)]
enum Stage {
    ToFile(ToolCommand, PathBuf),
    Plain(ToolCommand),
}

fn alignment_stages(
    reference: &Path,
    r1: &Path,
    r2: &Path,
    sam: &Path,
    bam: &Path,
    sorted_bam: &Path,
) -> Vec<Stage> {
    vec![
        Stage::ToFile(
            ToolCommand::new("bwa")
                .args(["mem", "-t"])
                .arg(BWA_THREADS.to_string())
                .arg(reference)
                .arg(r1)
                .arg(r2),
            sam.to_path_buf(),
        ),
        Stage::Plain(
            ToolCommand::new("samtools")
                .args(["view", "-bS"])
                .arg(sam)
                .arg("-o")
                .arg(bam),
        ),
        Stage::Plain(
            ToolCommand::new("samtools")
                .arg("sort")
                .arg(bam)
                .arg("-o")
                .arg(sorted_bam),
        ),
        Stage::Plain(ToolCommand::new("samtools").arg("index").arg(sorted_bam)),
    ]
}
