use std::io::Write;

use rand::Rng;

use crate::sampling::{lognormal, rng_from_seed, uniform};
use crate::ToolError;

const MZ_RANGE: (f64, f64) = (100.0, 1000.0);
const RT_RANGE: (f64, f64) = (1.0, 20.0);

/// Log-normal parameters (mean and sigma of the underlying normal).
type Profile = (f64, f64);

const UP: Profile = (10.0, 1.0);
const DOWN: Profile = (8.0, 1.0);
const UNCHANGED: Profile = (9.0, 1.5);
const NOISE: Profile = (5.0, 1.0);

/// Upper bound on compound plus noise rows in one table.
pub const MAX_TABLE_ROWS: usize = 10_000_000;

/// Parameters of a simulated two-group study.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakTableParams {
    /// Compound features before noise.
    pub num_compounds: usize,
    /// Sample columns, split into two groups.
    pub num_samples: usize,
    /// Noise peaks as a fraction of `num_compounds`.
    pub noise_level: f64,
    /// Seed for reproducible tables; fresh entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for PeakTableParams {
    fn default() -> Self {
        Self {
            num_compounds: 100,
            num_samples: 20,
            noise_level: 0.1,
            seed: None,
        }
    }
}

/// One feature row.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakRow {
    /// Mass-to-charge ratio.
    pub mz: f64,
    /// Retention time in minutes.
    pub rt: f64,
    /// One intensity per sample column.
    pub intensities: Vec<f64>,
}

/// Feature table: compound rows first, then noise rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakTable {
    /// Intensity columns per row.
    pub num_samples: usize,
    /// Feature rows.
    pub rows: Vec<PeakRow>,
}

impl PeakTableParams {
    /// Number of noise rows appended after the compounds.
    pub fn noise_rows(&self) -> Result<usize, ToolError> {
        self.validate_noise_level()?;
        let rows = (self.num_compounds as f64 * self.noise_level).floor();
        if rows > MAX_TABLE_ROWS as f64 {
            return Err(too_many_rows(self));
        }
        Ok(rows as usize)
    }

    /// Compound rows plus noise rows.
    pub fn total_rows(&self) -> Result<usize, ToolError> {
        self.num_compounds
            .checked_add(self.noise_rows()?)
            .filter(|&total| total <= MAX_TABLE_ROWS)
            .ok_or_else(|| too_many_rows(self))
    }

    fn validate_noise_level(&self) -> Result<(), ToolError> {
        if !self.noise_level.is_finite() || self.noise_level < 0.0 {
            return Err(ToolError::InvalidArgument(format!(
                "noise level {} must be a finite value >= 0",
                self.noise_level
            )));
        }
        Ok(())
    }
}

fn too_many_rows(params: &PeakTableParams) -> ToolError {
    ToolError::InvalidArgument(format!(
        "{} compounds at noise level {} exceed {MAX_TABLE_ROWS} rows",
        params.num_compounds, params.noise_level
    ))
}

/// Simulate a peak table.
///
/// The first quarter of compounds is up-regulated in the first half of the
/// samples, the second quarter is mirrored, the rest share one broader
/// distribution. Noise peaks are low-intensity features appended at the end.
pub fn simulate_peak_table(params: &PeakTableParams) -> Result<PeakTable, ToolError> {
    let total = params.total_rows()?;
    let mut rng = rng_from_seed(params.seed);
    let n = params.num_compounds;
    let half = params.num_samples / 2;

    // Compound m/z and RT are drawn as whole columns before any intensity.
    let mz: Vec<f64> = (0..n).map(|_| uniform(&mut rng, MZ_RANGE.0, MZ_RANGE.1)).collect();
    let rt: Vec<f64> = (0..n).map(|_| uniform(&mut rng, RT_RANGE.0, RT_RANGE.1)).collect();

    let mut rows = Vec::with_capacity(total);
    for i in 0..n {
        let position = i as f64;
        let (first, second) = if position < n as f64 / 4.0 {
            (UP, DOWN)
        } else if position < n as f64 / 2.0 {
            (DOWN, UP)
        } else {
            (UNCHANGED, UNCHANGED)
        };
        let intensities = (0..params.num_samples)
            .map(|s| {
                let (mean, sigma) = if s < half { first } else { second };
                lognormal(&mut rng, mean, sigma)
            })
            .collect();
        rows.push(PeakRow {
            mz: mz[i],
            rt: rt[i],
            intensities,
        });
    }

    let noise = total - n;
    let noise_mz: Vec<f64> = (0..noise).map(|_| uniform(&mut rng, MZ_RANGE.0, MZ_RANGE.1)).collect();
    let noise_rt: Vec<f64> = (0..noise).map(|_| uniform(&mut rng, RT_RANGE.0, RT_RANGE.1)).collect();
    for (mz, rt) in noise_mz.into_iter().zip(noise_rt) {
        rows.push(PeakRow {
            mz,
            rt,
            intensities: noise_intensities(&mut rng, params.num_samples),
        });
    }

    Ok(PeakTable {
        num_samples: params.num_samples,
        rows,
    })
}

fn noise_intensities<R: Rng + ?Sized>(rng: &mut R, num_samples: usize) -> Vec<f64> {
    (0..num_samples)
        .map(|_| lognormal(rng, NOISE.0, NOISE.1))
        .collect()
}

impl PeakTable {
    /// Column names: `mz`, `rt`, then `sample_1..sample_N`.
    pub fn header(&self) -> Vec<String> {
        ["mz".to_string(), "rt".to_string()]
            .into_iter()
            .chain((1..=self.num_samples).map(|i| format!("sample_{i}")))
            .collect()
    }

    /// Write the table as comma-separated values with a header line.
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> Result<(), ToolError> {
        writeln!(writer, "{}", self.header().join(","))?;
        for row in &self.rows {
            write!(writer, "{},{}", row.mz, row.rt)?;
            for value in &row.intensities {
                write!(writer, ",{value}")?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Render the table as a CSV string.
    pub fn render_csv(&self) -> Result<String, ToolError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|_| ToolError::InvalidArgument("rendered CSV is not valid UTF-8".to_string()))
    }
}
