use biogen::metabolomics::{simulate_peak_table, PeakTableParams};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn shape_and_positivity(
        num_compounds in 0usize..200,
        num_samples in 0usize..30,
        noise_level in 0.0f64..1.0,
        seed in any::<u64>(),
    ) {
        let params = PeakTableParams { num_compounds, num_samples, noise_level, seed: Some(seed) };
        let table = simulate_peak_table(&params).expect("valid parameters");

        let noise_rows = (num_compounds as f64 * noise_level).floor() as usize;
        prop_assert_eq!(table.rows.len(), num_compounds + noise_rows);
        for row in &table.rows {
            prop_assert_eq!(row.intensities.len(), num_samples);
            prop_assert!(row.intensities.iter().all(|&v| v > 0.0 && v.is_finite()));
            prop_assert!((100.0..=1000.0).contains(&row.mz));
            prop_assert!((1.0..=20.0).contains(&row.rt));
        }

        let csv = table.render_csv().expect("render");
        let mut lines = csv.lines();
        let header: Vec<&str> = lines.next().expect("header").split(',').collect();
        prop_assert_eq!(header.len(), num_samples + 2);
        prop_assert_eq!(header[0], "mz");
        prop_assert_eq!(header[1], "rt");
        if num_samples > 0 {
            prop_assert_eq!(header[num_samples + 1], format!("sample_{num_samples}"));
        }
        prop_assert_eq!(lines.count(), table.rows.len());
    }

    #[test]
    fn negative_noise_is_rejected(noise_level in -10.0f64..-1e-9) {
        let params = PeakTableParams { noise_level, seed: Some(1), ..PeakTableParams::default() };
        prop_assert!(simulate_peak_table(&params).is_err());
    }
}
