#[path = "common/mod.rs"]
mod common;
use biogen::variomics::{render_vcf, Site, VcfLayout};
use common::assert_snapshot;

#[test]
fn render_vcf_matches_golden() {
    let layout = VcfLayout {
        contig_id: "sim_contig".to_string(),
        contig_length: 100,
        num_individuals: 2,
        ploidy: 2,
    };
    let sites = vec![
        Site {
            position: 9,
            ancestral_state: b'A',
            mutations: Vec::new(),
            alleles: vec![b'A', b'G'],
            genotypes: vec![0, 1, 1, 0],
        },
        Site {
            position: 41,
            ancestral_state: b'C',
            mutations: Vec::new(),
            alleles: vec![b'C', b'T', b'A'],
            genotypes: vec![1, 0, 2, 0],
        },
    ];

    let actual = render_vcf(&layout, &sites).expect("VCF rendering should succeed");
    assert_snapshot("variants/phased.vcf", &actual);
}
