#[path = "common/mod.rs"]
mod common;
use biogen::proteomics::{render_mzml, Peak, Spectrum};
use common::assert_snapshot;

#[test]
fn render_mzml_matches_golden() {
    let spectra = vec![
        Spectrum {
            native_id: "spectrum_0".to_string(),
            rt: 0.0,
            ms_level: 2,
            peptide: "PEPTIDE".to_string(),
            peaks: vec![
                Peak { mz: 100.5, intensity: 1.0 },
                Peak { mz: 250.25, intensity: 0.1 },
            ],
        },
        Spectrum {
            native_id: "spectrum_1".to_string(),
            rt: 2.0,
            ms_level: 2,
            peptide: "A&B".to_string(),
            peaks: vec![Peak { mz: 75.125, intensity: 1.0 }],
        },
    ];

    let actual = render_mzml(&spectra).expect("mzML rendering should succeed");
    assert_snapshot("spectra/two_spectra.mzML", &actual);
}
