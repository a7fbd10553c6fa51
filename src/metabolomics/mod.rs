//! Metabolomics: simulated LC-MS feature tables for a two-group study.

mod table;

pub use table::{simulate_peak_table, PeakRow, PeakTable, PeakTableParams, MAX_TABLE_ROWS};

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::{ToolError, Toolbox};

/// CSV written by the peak-list simulator.
pub const METABOLOMICS_CSV_FILE: &str = "simulated_metabolomics_peaks.csv";

impl Toolbox {
    /// Simulate a peak table with fresh randomness and write it as CSV.
    pub fn simulate_metabolomics_peak_list(
        &self,
        num_compounds: usize,
        num_samples: usize,
        noise_level: f64,
    ) -> Result<PathBuf, ToolError> {
        self.simulate_metabolomics_peak_list_with(&PeakTableParams {
            num_compounds,
            num_samples,
            noise_level,
            seed: None,
        })
    }

    /// Simulate a peak table from explicit parameters, including an optional
    /// seed.
    pub fn simulate_metabolomics_peak_list_with(&self, params: &PeakTableParams) -> Result<PathBuf, ToolError> {
        tracing::info!(
            num_compounds = params.num_compounds,
            num_samples = params.num_samples,
            noise_level = params.noise_level,
            "simulating metabolomics peak list"
        );
        let table = simulate_peak_table(params)?;

        let dir = self.workspace().artifact_dir(
            "simulate_metabolomics_peak_list",
            &[
                params.num_compounds.to_string(),
                params.num_samples.to_string(),
                params.noise_level.to_string(),
                format!("{:?}", params.seed),
            ],
        )?;
        let csv_path = dir.join(METABOLOMICS_CSV_FILE);
        let mut writer = BufWriter::new(File::create(&csv_path)?);
        table.write_csv(&mut writer)?;

        tracing::info!(csv = %csv_path.display(), rows = table.rows.len(), "peak list generated");
        Ok(csv_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolConfig;

    #[test]
    fn writes_csv_into_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let toolbox = Toolbox::new(ToolConfig::new(dir.path(), dir.path()));
        let path = toolbox.simulate_metabolomics_peak_list(8, 2, 0.25).unwrap();
        assert_eq!(path, dir.path().join(METABOLOMICS_CSV_FILE));

        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 1 + 8 + 2);
    }

    #[test]
    fn seeded_runs_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let toolbox = Toolbox::new(ToolConfig::new(dir.path(), dir.path()));
        let params = PeakTableParams {
            seed: Some(11),
            ..PeakTableParams::default()
        };
        let first = std::fs::read(toolbox.simulate_metabolomics_peak_list_with(&params).unwrap()).unwrap();
        let second = std::fs::read(toolbox.simulate_metabolomics_peak_list_with(&params).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
