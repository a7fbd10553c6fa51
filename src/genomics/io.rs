use std::path::{Path, PathBuf};

use rust_htslib::bam::{self, header::Header, header::HeaderRecord, Read as BamRead, Writer};
use rust_htslib::bcf::{self, Read as BcfRead};

use crate::ToolError;

/// Create a BAM writer with a minimal header for a single-reference alignment.
///
/// `sort_order` is written to the `@HD SO` tag. The caller is responsible for
/// writing alignment records using the returned writer.
pub fn create_bam_writer<P: AsRef<Path>>(
    output_path: P,
    reference_name: &str,
    reference_length: usize,
    sort_order: &str,
) -> Result<Writer, ToolError> {
    let path = output_path.as_ref();
    let mut header = Header::new();

    let mut hd = HeaderRecord::new(b"HD");
    hd.push_tag(b"VN", &"1.6");
    hd.push_tag(b"SO", &sort_order);
    header.push_record(&hd);

    let mut sq = HeaderRecord::new(b"SQ");
    sq.push_tag(b"SN", reference_name);
    sq.push_tag(b"LN", &(reference_length as i64));
    header.push_record(&sq);

    bam::Writer::from_path(path, &header, bam::Format::Bam).map_err(|err| invalid(path, err))
}

/// Confirm that `path` is a coordinate-sorted BAM with a `.bai` index.
///
/// Returns the number of reference sequences declared in the header.
pub fn verify_sorted_bam(path: &Path) -> Result<u32, ToolError> {
    let reader = bam::Reader::from_path(path).map_err(|err| invalid(path, err))?;
    let header = reader.header();
    let text = String::from_utf8_lossy(header.as_bytes());
    let sorted = text
        .lines()
        .filter(|line| line.starts_with("@HD"))
        .any(|line| line.split('\t').any(|field| field == "SO:coordinate"));
    if !sorted {
        return Err(ToolError::InvalidOutput {
            path: path.to_path_buf(),
            reason: "header does not declare SO:coordinate".to_string(),
        });
    }
    if !with_suffix(path, ".bai").exists() {
        return Err(ToolError::InvalidOutput {
            path: path.to_path_buf(),
            reason: "missing .bai index".to_string(),
        });
    }
    Ok(header.target_count())
}

/// Confirm that `path` parses as VCF/BCF; with `require_index` a `.csi` or
/// `.tbi` sidecar must also exist.
///
/// Returns the number of samples declared in the header.
pub fn verify_variant_file(path: &Path, require_index: bool) -> Result<u32, ToolError> {
    let reader = bcf::Reader::from_path(path).map_err(|err| invalid(path, err))?;
    if require_index
        && !with_suffix(path, ".csi").exists()
        && !with_suffix(path, ".tbi").exists()
    {
        return Err(ToolError::InvalidOutput {
            path: path.to_path_buf(),
            reason: "missing .csi/.tbi index".to_string(),
        });
    }
    Ok(reader.header().sample_count())
}

/// Append a suffix to the full file name (`ref.fa` → `ref.fa.fai`).
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

fn invalid(path: &Path, err: impl std::fmt::Display) -> ToolError {
    ToolError::InvalidOutput {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_keeps_extension() {
        assert_eq!(
            with_suffix(Path::new("/data/ref.fa"), ".fai"),
            PathBuf::from("/data/ref.fa.fai")
        );
    }

    #[test]
    fn unsorted_bam_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unsorted.bam");
        drop(create_bam_writer(&path, "chr1", 1000, "unknown").unwrap());
        std::fs::write(with_suffix(&path, ".bai"), b"").unwrap();

        let err = verify_sorted_bam(&path).unwrap_err();
        assert!(err.to_string().contains("SO:coordinate"));
    }

    #[test]
    fn sorted_bam_requires_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sorted.bam");
        drop(create_bam_writer(&path, "chr1", 1000, "coordinate").unwrap());

        let err = verify_sorted_bam(&path).unwrap_err();
        assert!(err.to_string().contains(".bai"));

        std::fs::write(with_suffix(&path, ".bai"), b"").unwrap();
        assert_eq!(verify_sorted_bam(&path).unwrap(), 1);
    }

    #[test]
    fn garbage_is_not_a_bam() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.bam");
        std::fs::write(&path, b"not a bam").unwrap();
        assert!(matches!(
            verify_sorted_bam(&path),
            Err(ToolError::InvalidOutput { .. })
        ));
    }
}
