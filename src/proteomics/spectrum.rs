//! Theoretical fragment spectra.

use super::residues::{loses_ammonia, loses_water, residue_mass, H2O, NH3, PROTON};

/// Relative intensity of a backbone fragment.
pub const FRAGMENT_INTENSITY: f64 = 1.0;
/// Relative intensity of a neutral-loss satellite.
pub const NEUTRAL_LOSS_INTENSITY: f64 = 0.1;
/// Fragment charge states generated.
pub const FRAGMENT_CHARGES: [u32; 2] = [1, 2];

/// One centroided peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Mass-to-charge ratio.
    pub mz: f64,
    /// Relative intensity.
    pub intensity: f64,
}

/// A simulated MS2 spectrum for one peptide.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Identifier written as the mzML `id` attribute.
    pub native_id: String,
    /// Retention time in seconds.
    pub rt: f64,
    /// MS level (always 2).
    pub ms_level: u8,
    /// Source peptide sequence.
    pub peptide: String,
    /// Peaks sorted by ascending m/z.
    pub peaks: Vec<Peak>,
}

/// b and y fragment series for `peptide` at charges 1 and 2, with H2O and NH3
/// losses where the fragment carries a residue that can shed them.
///
/// Returns `None` if the peptide contains an unknown residue.
pub fn fragment_peaks(peptide: &str) -> Option<Vec<Peak>> {
    let residues = peptide.as_bytes();
    let masses: Vec<f64> = residues.iter().map(|&r| residue_mass(r)).collect::<Option<_>>()?;
    let n = residues.len();

    let mut peaks = Vec::new();
    // b ions: prefixes of length 2..n-1 (b1 is rarely observed).
    let mut prefix = masses.first().copied().unwrap_or(0.0);
    for len in 2..n {
        prefix += masses[len - 1];
        push_fragment(&mut peaks, prefix, &residues[..len]);
    }
    // y ions: suffixes of length 1..n-1, carrying the C-terminal water.
    let mut suffix = H2O;
    for len in 1..n {
        suffix += masses[n - len];
        push_fragment(&mut peaks, suffix, &residues[n - len..]);
    }

    peaks.sort_by(|a, b| a.mz.total_cmp(&b.mz));
    Some(peaks)
}

fn push_fragment(peaks: &mut Vec<Peak>, neutral: f64, residues: &[u8]) {
    let water = residues.iter().any(|&r| loses_water(r));
    let ammonia = residues.iter().any(|&r| loses_ammonia(r));
    for z in FRAGMENT_CHARGES {
        peaks.push(Peak { mz: mz(neutral, z), intensity: FRAGMENT_INTENSITY });
        if water {
            peaks.push(Peak { mz: mz(neutral - H2O, z), intensity: NEUTRAL_LOSS_INTENSITY });
        }
        if ammonia {
            peaks.push(Peak { mz: mz(neutral - NH3, z), intensity: NEUTRAL_LOSS_INTENSITY });
        }
    }
}

fn mz(neutral: f64, charge: u32) -> f64 {
    let z = f64::from(charge);
    (neutral + z * PROTON) / z
}

impl Spectrum {
    /// Build the MS2 spectrum for the `index`-th peptide of a run.
    pub fn simulate(index: usize, peptide: &str, rt_step: f64) -> Option<Self> {
        Some(Spectrum {
            native_id: format!("spectrum_{index}"),
            rt: index as f64 * rt_step,
            ms_level: 2,
            peptide: peptide.to_string(),
            peaks: fragment_peaks(peptide)?,
        })
    }
}
