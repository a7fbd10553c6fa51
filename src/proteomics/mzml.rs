//! Minimal mzML 1.1 writer for centroided MS2 spectra.

use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::spectrum::Spectrum;
use crate::ToolError;

const MZML_VERSION: &str = "1.1.0";
const SOFTWARE_ID: &str = "biogen";

/// Write `spectra` as a non-indexed mzML document.
pub fn write_mzml<W: Write>(writer: &mut W, spectra: &[Spectrum]) -> Result<(), ToolError> {
    writeln!(writer, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(
        writer,
        r#"<mzML xmlns="http://psi.hupo.org/ms/mzml" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" version="{MZML_VERSION}">"#
    )?;
    writeln!(writer, r#"  <cvList count="2">"#)?;
    writeln!(
        writer,
        r#"    <cv id="MS" fullName="Proteomics Standards Initiative Mass Spectrometry Ontology" URI="https://raw.githubusercontent.com/HUPO-PSI/psi-ms-CV/master/psi-ms.obo"/>"#
    )?;
    writeln!(
        writer,
        r#"    <cv id="UO" fullName="Unit Ontology" URI="https://raw.githubusercontent.com/bio-ontology-research-group/unit-ontology/master/unit.obo"/>"#
    )?;
    writeln!(writer, "  </cvList>")?;
    writeln!(writer, "  <fileDescription>")?;
    writeln!(writer, "    <fileContent>")?;
    cv_param(writer, 6, "MS:1000580", "MSn spectrum", None)?;
    writeln!(writer, "    </fileContent>")?;
    writeln!(writer, "  </fileDescription>")?;
    writeln!(writer, r#"  <softwareList count="1">"#)?;
    writeln!(
        writer,
        r#"    <software id="{SOFTWARE_ID}" version="{}"/>"#,
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(writer, "  </softwareList>")?;
    writeln!(writer, r#"  <instrumentConfigurationList count="1">"#)?;
    writeln!(writer, r#"    <instrumentConfiguration id="IC1"/>"#)?;
    writeln!(writer, "  </instrumentConfigurationList>")?;
    writeln!(writer, r#"  <dataProcessingList count="1">"#)?;
    writeln!(writer, r#"    <dataProcessing id="simulation">"#)?;
    writeln!(
        writer,
        r#"      <processingMethod order="0" softwareRef="{SOFTWARE_ID}"/>"#
    )?;
    writeln!(writer, "    </dataProcessing>")?;
    writeln!(writer, "  </dataProcessingList>")?;
    writeln!(
        writer,
        r#"  <run id="simulated_run" defaultInstrumentConfigurationRef="IC1">"#
    )?;
    writeln!(
        writer,
        r#"    <spectrumList count="{}" defaultDataProcessingRef="simulation">"#,
        spectra.len()
    )?;
    for (index, spectrum) in spectra.iter().enumerate() {
        write_spectrum(writer, index, spectrum)?;
    }
    writeln!(writer, "    </spectrumList>")?;
    writeln!(writer, "  </run>")?;
    writeln!(writer, "</mzML>")?;
    writer.flush()?;
    Ok(())
}

/// Render spectra into an mzML string.
pub fn render_mzml(spectra: &[Spectrum]) -> Result<String, ToolError> {
    let mut buffer = Vec::new();
    write_mzml(&mut buffer, spectra)?;
    String::from_utf8(buffer)
        .map_err(|_| ToolError::InvalidArgument("rendered mzML is not valid UTF-8".to_string()))
}

fn write_spectrum<W: Write>(writer: &mut W, index: usize, spectrum: &Spectrum) -> Result<(), ToolError> {
    writeln!(
        writer,
        r#"      <spectrum index="{index}" id="{}" defaultArrayLength="{}">"#,
        escape(&spectrum.native_id),
        spectrum.peaks.len()
    )?;
    cv_param(writer, 8, "MS:1000511", "ms level", Some(&spectrum.ms_level.to_string()))?;
    cv_param(writer, 8, "MS:1000580", "MSn spectrum", None)?;
    cv_param(writer, 8, "MS:1000127", "centroid spectrum", None)?;
    writeln!(
        writer,
        r#"        <userParam name="peptide" value="{}"/>"#,
        escape(&spectrum.peptide)
    )?;
    writeln!(writer, r#"        <scanList count="1">"#)?;
    cv_param(writer, 10, "MS:1000795", "no combination", None)?;
    writeln!(writer, "          <scan>")?;
    writeln!(
        writer,
        r#"            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="{}" unitCvRef="UO" unitAccession="UO:0000010" unitName="second"/>"#,
        spectrum.rt
    )?;
    writeln!(writer, "          </scan>")?;
    writeln!(writer, "        </scanList>")?;

    let mz: Vec<f64> = spectrum.peaks.iter().map(|p| p.mz).collect();
    let intensity: Vec<f64> = spectrum.peaks.iter().map(|p| p.intensity).collect();
    writeln!(writer, r#"        <binaryDataArrayList count="2">"#)?;
    write_binary_array(writer, &mz, "MS:1000514", "m/z array")?;
    write_binary_array(writer, &intensity, "MS:1000515", "intensity array")?;
    writeln!(writer, "        </binaryDataArrayList>")?;
    writeln!(writer, "      </spectrum>")?;
    Ok(())
}

fn write_binary_array<W: Write>(
    writer: &mut W,
    values: &[f64],
    accession: &str,
    name: &str,
) -> Result<(), ToolError> {
    let encoded = encode_f64_array(values);
    writeln!(
        writer,
        r#"          <binaryDataArray encodedLength="{}">"#,
        encoded.len()
    )?;
    cv_param(writer, 12, "MS:1000523", "64-bit float", None)?;
    cv_param(writer, 12, "MS:1000576", "no compression", None)?;
    cv_param(writer, 12, accession, name, None)?;
    writeln!(writer, "            <binary>{encoded}</binary>")?;
    writeln!(writer, "          </binaryDataArray>")?;
    Ok(())
}

fn cv_param<W: Write>(
    writer: &mut W,
    indent: usize,
    accession: &str,
    name: &str,
    value: Option<&str>,
) -> Result<(), ToolError> {
    writeln!(
        writer,
        r#"{:indent$}<cvParam cvRef="MS" accession="{accession}" name="{}" value="{}"/>"#,
        "",
        escape(name),
        escape(value.unwrap_or(""))
    )?;
    Ok(())
}

/// Little-endian 64-bit floats, base64 encoded.
pub fn encode_f64_array(values: &[f64]) -> String {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    STANDARD.encode(bytes)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_are_little_endian_doubles() {
        let encoded = encode_f64_array(&[1.0]);
        let bytes = STANDARD.decode(encoded).unwrap();
        assert_eq!(bytes, 1.0f64.to_le_bytes());
    }

    #[test]
    fn document_lists_every_spectrum() {
        let spectra: Vec<Spectrum> = ["PEPTIDE", "SAMPLER"]
            .iter()
            .enumerate()
            .map(|(i, p)| Spectrum::simulate(i, p, 2.0).unwrap())
            .collect();
        let xml = render_mzml(&spectra).unwrap();
        assert!(xml.contains(r#"version="1.1.0""#));
        assert!(xml.contains(r#"<spectrumList count="2""#));
        assert!(xml.contains(r#"id="spectrum_1""#));
        assert!(xml.contains(r#"name="peptide" value="SAMPLER""#));
        assert!(xml.contains(r#"accession="MS:1000016" name="scan start time" value="2""#));
        assert_eq!(xml.matches("<binaryDataArray ").count(), 4);
    }

    #[test]
    fn attributes_are_escaped() {
        assert_eq!(escape(r#"a<b>&"c""#), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
