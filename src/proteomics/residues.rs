//! Monoisotopic masses.

/// Mass of water.
pub const H2O: f64 = 18.010_564_683_7;
/// Mass of ammonia.
pub const NH3: f64 = 17.026_549_101_5;
/// Mass of a proton.
pub const PROTON: f64 = 1.007_276_466_812;

/// Monoisotopic residue mass for a one-letter amino-acid code.
pub fn residue_mass(code: u8) -> Option<f64> {
    let mass = match code.to_ascii_uppercase() {
        b'G' => 57.021_463_72,
        b'A' => 71.037_113_81,
        b'S' => 87.032_028_44,
        b'P' => 97.052_763_88,
        b'V' => 99.068_413_95,
        b'T' => 101.047_678_50,
        b'C' => 103.009_184_51,
        b'L' | b'I' => 113.084_064_01,
        b'N' => 114.042_927_44,
        b'D' => 115.026_943_03,
        b'Q' => 128.058_577_51,
        b'K' => 128.094_963_02,
        b'E' => 129.042_593_09,
        b'M' => 131.040_484_63,
        b'H' => 137.058_911_86,
        b'F' => 147.068_413_95,
        b'U' => 150.953_633_41,
        b'R' => 156.101_111_05,
        b'Y' => 163.063_328_57,
        b'W' => 186.079_312_98,
        b'O' => 237.147_726_95,
        _ => return None,
    };
    Some(mass)
}

/// Residues that can shed water from a fragment.
pub fn loses_water(code: u8) -> bool {
    matches!(code.to_ascii_uppercase(), b'S' | b'T' | b'E' | b'D')
}

/// Residues that can shed ammonia from a fragment.
pub fn loses_ammonia(code: u8) -> bool {
    matches!(code.to_ascii_uppercase(), b'R' | b'K' | b'N' | b'Q')
}

/// Neutral monoisotopic mass of a peptide, or `None` if it contains an
/// unknown residue code.
pub fn peptide_mass(sequence: &str) -> Option<f64> {
    sequence
        .bytes()
        .map(residue_mass)
        .sum::<Option<f64>>()
        .map(|residues| residues + H2O)
}
