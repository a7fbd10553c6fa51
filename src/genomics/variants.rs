use std::path::{Path, PathBuf};

use crate::process::ToolCommand;
use crate::{require_input, ToolError, Toolbox};

use super::io::{verify_variant_file, with_suffix};
use super::VARIANTS_VCF_FILE;

impl Toolbox {
    /// Call variants from a sorted BAM with `bcftools mpileup | bcftools call`
    /// and return a bgzip-compressed, indexed VCF.
    ///
    /// Both pipe stages are checked; a failing `mpileup` is reported with its
    /// own stderr even when `call` exits cleanly on the truncated stream.
    pub fn call_variants_bcftools(
        &self,
        sorted_bam: &Path,
        reference_fasta: &Path,
    ) -> Result<PathBuf, ToolError> {
        require_input(sorted_bam)?;
        require_input(reference_fasta)?;
        tracing::info!(bam = %sorted_bam.display(), "calling variants");

        self.ensure_faidx(reference_fasta)?;

        let dir = self.workspace().artifact_dir(
            "call_variants_bcftools",
            &[
                sorted_bam.display().to_string(),
                reference_fasta.display().to_string(),
            ],
        )?;
        let vcf_path = dir.join(VARIANTS_VCF_FILE);

        let (mpileup, call) = calling_pipeline(reference_fasta, sorted_bam, &vcf_path);
        self.runner().run_piped(&mpileup, &call)?;
        self.runner()
            .run(&ToolCommand::new("bcftools").arg("index").arg(&vcf_path))?;

        verify_variant_file(&vcf_path, true)?;
        tracing::info!(vcf = %vcf_path.display(), "variants called");
        Ok(vcf_path)
    }

    fn ensure_faidx(&self, reference_fasta: &Path) -> Result<(), ToolError> {
        if with_suffix(reference_fasta, ".fai").exists() {
            return Ok(());
        }
        tracing::info!(reference = %reference_fasta.display(), "building fasta index");
        self.runner()
            .run(&ToolCommand::new("samtools").arg("faidx").arg(reference_fasta))?;
        Ok(())
    }
}

fn calling_pipeline(reference: &Path, bam: &Path, vcf: &Path) -> (ToolCommand, ToolCommand) {
    let mpileup = ToolCommand::new("bcftools")
        .args(["mpileup", "-f"])
        .arg(reference)
        .arg(bam);
    let call = ToolCommand::new("bcftools")
        .args(["call", "-mv", "-Oz", "-o"])
        .arg(vcf);
    (mpileup, call)
}
