use std::path::{Path, PathBuf};

use crate::process::ToolCommand;
use crate::{require_input, ToolError, Toolbox};

use super::{READS_R1_FILE, READS_R2_FILE};

/// Outer distance between read ends passed to `wgsim -d`.
pub const READ_OUTER_DISTANCE: u32 = 300;
/// Length of each mate passed to `wgsim -1/-2`.
pub const READ_LENGTH: u32 = 100;

/// Paths of a paired-end FASTQ pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPair {
    /// First mates.
    pub r1: PathBuf,
    /// Second mates.
    pub r2: PathBuf,
}

impl Toolbox {
    /// Simulate paired-end reads from `reference_fasta` with `wgsim`.
    ///
    /// Fails with [`ToolError::MissingInput`] before launching anything when
    /// the reference does not exist.
    pub fn simulate_dna_reads_paired(
        &self,
        reference_fasta: &Path,
        num_reads: u64,
        mutation_rate: f64,
    ) -> Result<ReadPair, ToolError> {
        require_input(reference_fasta)?;
        if !(0.0..=1.0).contains(&mutation_rate) {
            return Err(ToolError::InvalidArgument(format!(
                "mutation rate {mutation_rate} is outside [0, 1]"
            )));
        }
        tracing::info!(num_reads, mutation_rate, "simulating paired-end DNA reads");

        let dir = self.workspace().artifact_dir(
            "simulate_dna_reads_paired",
            &[
                reference_fasta.display().to_string(),
                num_reads.to_string(),
                mutation_rate.to_string(),
            ],
        )?;
        let pair = ReadPair {
            r1: dir.join(READS_R1_FILE),
            r2: dir.join(READS_R2_FILE),
        };

        let wgsim = wgsim_command(reference_fasta, num_reads, mutation_rate, &pair);
        self.runner().run(&wgsim)?;

        for path in [&pair.r1, &pair.r2] {
            if !path.exists() {
                return Err(ToolError::InvalidOutput {
                    path: path.clone(),
                    reason: "wgsim exited successfully but wrote no file".to_string(),
                });
            }
        }

        tracing::info!(r1 = %pair.r1.display(), r2 = %pair.r2.display(), "DNA reads generated");
        Ok(pair)
    }
}

fn wgsim_command(reference: &Path, num_reads: u64, mutation_rate: f64, out: &ReadPair) -> ToolCommand {
    ToolCommand::new("wgsim")
        .args(["-N".to_string(), num_reads.to_string()])
        .args(["-r".to_string(), mutation_rate.to_string()])
        .args(["-d".to_string(), READ_OUTER_DISTANCE.to_string()])
        .args(["-1".to_string(), READ_LENGTH.to_string()])
        .args(["-2".to_string(), READ_LENGTH.to_string()])
        .arg(reference)
        .arg(&out.r1)
        .arg(&out.r2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolConfig;

    #[test]
    fn wgsim_arguments_are_fixed() {
        let pair = ReadPair {
            r1: PathBuf::from("ws/sim_reads_r1.fastq"),
            r2: PathBuf::from("ws/sim_reads_r2.fastq"),
        };
        let cmd = wgsim_command(Path::new("ref.fa"), 1000, 0.001, &pair);
        let args: Vec<_> = cmd
            .arguments()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-N", "1000", "-r", "0.001", "-d", "300", "-1", "100", "-2", "100", "ref.fa",
                "ws/sim_reads_r1.fastq", "ws/sim_reads_r2.fastq"
            ]
        );
    }

    #[test]
    fn rejects_out_of_range_mutation_rate() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("ref.fa");
        std::fs::write(&reference, ">chr1\nACGT\n").unwrap();
        let toolbox = Toolbox::new(ToolConfig::new(dir.path().join("ws"), dir.path()));
        let err = toolbox
            .simulate_dna_reads_paired(&reference, 10, 1.5)
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument(_)));
    }
}
