//! Proteomics: in-silico digestion of a protein database and theoretical
//! MS/MS spectra written as mzML.

mod enzyme;
mod mzml;
mod residues;
mod spectrum;

pub use enzyme::Protease;
pub use mzml::{encode_f64_array, render_mzml, write_mzml};
pub use residues::{peptide_mass, residue_mass, H2O, NH3, PROTON};
pub use spectrum::{fragment_peaks, Peak, Spectrum};

use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::genomics::{read_fasta, FastaRecord};
use crate::{require_input, ToolError, Toolbox};

/// mzML written by the spectrum simulator.
pub const PROTEOMICS_MZML_FILE: &str = "simulated_proteomics.mzML";
/// Enzyme used when none is given.
pub const DEFAULT_ENZYME: &str = "Trypsin";
/// Upper bound on spectra per run.
pub const MAX_SPECTRA: usize = 100;
/// Shortest peptide kept after digestion.
pub const MIN_PEPTIDE_LENGTH: usize = 6;
/// Longest peptide kept after digestion.
pub const MAX_PEPTIDE_LENGTH: usize = 40;
/// Seconds between consecutive spectra.
pub const RT_STEP: f64 = 2.0;

/// Digest `proteins`, keep peptides within the length window, and return the
/// distinct ones in first-seen order, at most [`MAX_SPECTRA`].
pub fn select_peptides(proteins: &[FastaRecord], protease: &Protease) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut peptides = Vec::new();
    for protein in proteins {
        for peptide in protease.digest(&protein.sequence) {
            if !(MIN_PEPTIDE_LENGTH..=MAX_PEPTIDE_LENGTH).contains(&peptide.len()) {
                continue;
            }
            if seen.insert(peptide) {
                peptides.push(peptide.to_string());
            }
        }
    }
    peptides.truncate(MAX_SPECTRA);
    peptides
}

/// Build one spectrum per peptide, skipping peptides with unknown residues.
pub fn simulate_spectra(peptides: &[String]) -> Vec<Spectrum> {
    peptides
        .iter()
        .enumerate()
        .filter_map(|(index, peptide)| {
            let spectrum = Spectrum::simulate(index, peptide, RT_STEP);
            if spectrum.is_none() {
                tracing::warn!(%peptide, "skipping peptide with unknown residue");
            }
            spectrum
        })
        .collect()
}

impl Toolbox {
    /// Digest `protein_fasta` with `enzyme` and write theoretical spectra for
    /// up to [`MAX_SPECTRA`] peptides.
    pub fn simulate_ms_spectra(&self, protein_fasta: &Path, enzyme: &str) -> Result<PathBuf, ToolError> {
        require_input(protein_fasta)?;
        let protease: Protease = enzyme.parse()?;
        tracing::info!(fasta = %protein_fasta.display(), %protease, "simulating MS/MS spectra");

        let proteins = read_fasta(protein_fasta)?;
        let peptides = select_peptides(&proteins, &protease);
        let spectra = simulate_spectra(&peptides);
        tracing::debug!(proteins = proteins.len(), peptides = peptides.len(), "digested");

        let dir = self.workspace().artifact_dir(
            "simulate_ms_spectra",
            &[protein_fasta.display().to_string(), protease.to_string()],
        )?;
        let mzml_path = dir.join(PROTEOMICS_MZML_FILE);
        let mut writer = BufWriter::new(File::create(&mzml_path)?);
        write_mzml(&mut writer, &spectra)?;

        tracing::info!(mzml = %mzml_path.display(), spectra = spectra.len(), "spectra simulated");
        Ok(mzml_path)
    }
}
