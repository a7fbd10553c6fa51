//! Protease cleavage rules and in-silico digestion.

use std::fmt;
use std::str::FromStr;

use crate::ToolError;

/// A sequence-specific protease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protease {
    name: &'static str,
    /// Cleave C-terminal to these residues.
    after: &'static [u8],
    /// Cleave N-terminal to these residues.
    before: &'static [u8],
    /// A following proline blocks cleavage.
    proline_blocks: bool,
}

const PROTEASES: &[Protease] = &[
    Protease { name: "Trypsin", after: b"KR", before: b"", proline_blocks: true },
    Protease { name: "Trypsin/P", after: b"KR", before: b"", proline_blocks: false },
    Protease { name: "Lys-C", after: b"K", before: b"", proline_blocks: true },
    Protease { name: "Lys-C/P", after: b"K", before: b"", proline_blocks: false },
    Protease { name: "Arg-C", after: b"R", before: b"", proline_blocks: true },
    Protease { name: "Asp-N", after: b"", before: b"BD", proline_blocks: false },
    Protease { name: "Glu-C", after: b"E", before: b"", proline_blocks: true },
    Protease { name: "Chymotrypsin", after: b"FYWL", before: b"", proline_blocks: true },
    Protease { name: "no cleavage", after: b"", before: b"", proline_blocks: false },
];

impl Protease {
    /// Enzyme name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Names of all supported enzymes.
    pub fn supported() -> impl Iterator<Item = &'static str> {
        PROTEASES.iter().map(|p| p.name)
    }

    /// Offsets `i` such that the bond between `i - 1` and `i` is cleaved.
    pub fn cleavage_sites(&self, sequence: &[u8]) -> Vec<usize> {
        (1..sequence.len())
            .filter(|&i| {
                let prev = sequence[i - 1].to_ascii_uppercase();
                let next = sequence[i].to_ascii_uppercase();
                let cut = self.after.contains(&prev) || self.before.contains(&next);
                cut && !(self.proline_blocks && next == b'P')
            })
            .collect()
    }

    /// Fully specific digest without missed cleavages.
    pub fn digest<'a>(&self, sequence: &'a str) -> Vec<&'a str> {
        let mut peptides = Vec::new();
        let mut start = 0;
        for site in self.cleavage_sites(sequence.as_bytes()) {
            peptides.push(&sequence[start..site]);
            start = site;
        }
        if start < sequence.len() {
            peptides.push(&sequence[start..]);
        }
        peptides
    }
}

impl FromStr for Protease {
    type Err = ToolError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        PROTEASES
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .copied()
            .ok_or_else(|| {
                ToolError::InvalidArgument(format!(
                    "unknown enzyme '{name}' (supported: {})",
                    Protease::supported().collect::<Vec<_>>().join(", ")
                ))
            })
    }
}

impl fmt::Display for Protease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Trypsin", "MKWVTFISLLRPAK", &["MK", "WVTFISLLRPAK"]; "trypsin skips proline")]
    #[test_case("Trypsin/P", "MKWVTFISLLRPAK", &["MK", "WVTFISLLR", "PAK"]; "trypsin p ignores proline")]
    #[test_case("Lys-C", "AAKBBRCCK", &["AAK", "BBRCCK"]; "lys-c only lysine")]
    #[test_case("Asp-N", "AADEEDCC", &["AA", "DEE", "DCC"]; "asp-n cuts before")]
    #[test_case("no cleavage", "AAKRDD", &["AAKRDD"]; "whole protein")]
    fn digests(enzyme: &str, protein: &str, expected: &[&str]) {
        let protease: Protease = enzyme.parse().unwrap();
        assert_eq!(protease.digest(protein), expected);
    }

    #[test]
    fn enzyme_names_are_case_insensitive() {
        assert_eq!("trypsin".parse::<Protease>().unwrap().name(), "Trypsin");
    }

    #[test]
    fn unknown_enzyme_lists_supported() {
        let err = "Pepsin A".parse::<Protease>().unwrap_err();
        assert!(err.to_string().contains("Trypsin"));
    }

    #[test]
    fn trailing_cleavage_site_leaves_no_empty_peptide() {
        let trypsin: Protease = "Trypsin".parse().unwrap();
        assert_eq!(trypsin.digest("AAK"), vec!["AAK"]);
    }
}
