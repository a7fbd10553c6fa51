use std::io::Write;

use super::mutations::Site;
use crate::ToolError;

/// Layout of the samples written into the VCF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfLayout {
    /// Contig name for every record.
    pub contig_id: String,
    /// Contig length declared in the header.
    pub contig_length: u64,
    /// Number of individuals (sample columns).
    pub num_individuals: usize,
    /// Genome copies per individual; genotypes are phased.
    pub ploidy: usize,
}

/// Write sites as phased VCF, one column per individual (`tsk_<i>`).
///
/// Positions are written 1-based; the site index doubles as the record ID.
pub fn write_vcf<W: Write>(writer: &mut W, layout: &VcfLayout, sites: &[Site]) -> Result<(), ToolError> {
    writeln!(writer, "##fileformat=VCFv4.2")?;
    writeln!(writer, "##source=biogen coalescent simulator")?;
    writeln!(writer, "##FILTER=<ID=PASS,Description=\"All filters passed\">")?;
    writeln!(
        writer,
        "##contig=<ID={},length={}>",
        layout.contig_id, layout.contig_length
    )?;
    writeln!(
        writer,
        "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">"
    )?;
    write!(writer, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT")?;
    for individual in 0..layout.num_individuals {
        write!(writer, "\ttsk_{individual}")?;
    }
    writeln!(writer)?;

    for (index, site) in sites.iter().enumerate() {
        let alt: Vec<String> = site.alleles[1..]
            .iter()
            .map(|&a| (a as char).to_string())
            .collect();
        write!(
            writer,
            "{chrom}\t{pos}\t{index}\t{ref_base}\t{alt}\t.\tPASS\t.\tGT",
            chrom = layout.contig_id,
            pos = site.position + 1,
            ref_base = site.ancestral_state as char,
            alt = alt.join(","),
        )?;
        for genotype in site.genotypes.chunks(layout.ploidy.max(1)) {
            let calls: Vec<String> = genotype.iter().map(usize::to_string).collect();
            write!(writer, "\t{}", calls.join("|"))?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Render sites into a VCF string (useful for tests and snapshots).
pub fn render_vcf(layout: &VcfLayout, sites: &[Site]) -> Result<String, ToolError> {
    let mut buffer = Vec::new();
    write_vcf(&mut buffer, layout, sites)?;
    String::from_utf8(buffer).map_err(|_| ToolError::InvalidArgument("rendered VCF is not valid UTF-8".to_string()))
}
