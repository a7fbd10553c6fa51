//! Aligner and variant caller run end to end against shell stand-ins for
//! `bwa`, `samtools` and `bcftools` placed in the configured tool directory.
//! Each stand-in appends its arguments to a call log and produces the file the
//! next stage expects; sorted BAM and VCF outputs are real files so the htslib
//! checks run as they do in production.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use biogen::genomics::{create_bam_writer, ALIGNED_BAM_FILE, ALIGNED_SAM_FILE, SORTED_BAM_FILE};
use biogen::{ToolConfig, ToolError, Toolbox};

// Scripts are written and executed in the same process; keep one test at a
// time so no concurrent fork holds a script open for writing.
static SERIAL: Mutex<()> = Mutex::new(());

const VCF_FIXTURE: &str = "##fileformat=VCFv4.2\n\
##contig=<ID=chr1,length=1000>\n\
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tsample\n\
chr1\t10\t.\tA\tG\t50\tPASS\t.\tGT\t0/1\n";

struct Pipeline {
    root: tempfile::TempDir,
}

impl Pipeline {
    fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(root.path().join("bin")).expect("bin dir");
        fs::write(root.path().join("calls.log"), "").expect("call log");

        let pipeline = Self { root };
        drop(
            create_bam_writer(pipeline.path("fixture.sorted.bam"), "chr1", 1000, "coordinate")
                .expect("fixture BAM"),
        );
        fs::write(pipeline.path("fixture.vcf"), VCF_FIXTURE).expect("fixture VCF");
        fs::write(pipeline.reference(), ">chr1\nACGTACGTAC\n").expect("reference");
        fs::write(pipeline.path("r1.fastq"), "@r\nACGT\n+\nIIII\n").expect("r1");
        fs::write(pipeline.path("r2.fastq"), "@r\nACGT\n+\nIIII\n").expect("r2");
        pipeline
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    fn reference(&self) -> PathBuf {
        self.path("ref.fa")
    }

    fn workspace(&self) -> PathBuf {
        self.path("workspace")
    }

    fn toolbox(&self) -> Toolbox {
        Toolbox::new(ToolConfig::new(self.workspace(), self.root.path()).with_tool_dir(self.path("bin")))
    }

    /// Install a stand-in whose body sees its arguments as `$1..`.
    fn install(&self, program: &str, body: &str) {
        let log = self.path("calls.log");
        let script = format!(
            "#!/bin/sh\necho \"{program} $*\" >> '{}'\n{body}\n",
            log.display()
        );
        let path = self.path("bin").join(program);
        fs::write(&path, script).expect("write stand-in");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod stand-in");
    }

    fn install_aligner(&self, sort_body: &str) {
        self.install(
            "bwa",
            "case \"$1\" in\n\
             index) touch \"$2.bwt\" ;;\n\
             mem) printf '@HD\\tVN:1.6\\n' ;;\n\
             esac",
        );
        let fixture = self.path("fixture.sorted.bam");
        self.install(
            "samtools",
            &format!(
                "case \"$1\" in\n\
                 view) echo bam > \"$5\" ;;\n\
                 sort) {sort_body} ;;\n\
                 index) touch \"$2.bai\" ;;\n\
                 faidx) touch \"$2.fai\" ;;\n\
                 esac",
                sort_body = sort_body.replace("{fixture}", &fixture.display().to_string()),
            ),
        );
    }

    fn install_caller(&self, mpileup_body: &str) {
        self.install("samtools", "case \"$1\" in\nfaidx) touch \"$2.fai\" ;;\nesac");
        let fixture = self.path("fixture.vcf");
        self.install(
            "bcftools",
            &format!(
                "case \"$1\" in\n\
                 mpileup) {mpileup_body} ;;\n\
                 call) cat > /dev/null; cp '{}' \"$5\" ;;\n\
                 index) touch \"$2.csi\" ;;\n\
                 esac",
                fixture.display()
            ),
        );
    }

    /// Logged calls as `program subcommand`.
    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.path("calls.log"))
            .expect("read call log")
            .lines()
            .map(|line| line.split_whitespace().take(2).collect::<Vec<_>>().join(" "))
            .collect()
    }

    fn log_text(&self) -> String {
        fs::read_to_string(self.path("calls.log")).expect("read call log")
    }
}

fn lock() -> std::sync::MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

const SORT_OK: &str = "cp '{fixture}' \"$4\"";

#[test]
fn alignment_indexes_runs_stages_in_order_and_removes_intermediates() {
    let _guard = lock();
    let pipeline = Pipeline::new();
    pipeline.install_aligner(SORT_OK);

    let bam = pipeline
        .toolbox()
        .align_reads_bwa(&pipeline.reference(), &pipeline.path("r1.fastq"), &pipeline.path("r2.fastq"))
        .expect("alignment succeeds");

    assert_eq!(bam, pipeline.workspace().join(SORTED_BAM_FILE));
    assert_eq!(
        pipeline.calls(),
        ["bwa index", "bwa mem", "samtools view", "samtools sort", "samtools index"]
    );
    assert!(pipeline.log_text().contains("bwa mem -t 4 "));
    assert!(bam.exists());
    assert!(pipeline.workspace().join(format!("{SORTED_BAM_FILE}.bai")).exists());
    assert!(!pipeline.workspace().join(ALIGNED_SAM_FILE).exists());
    assert!(!pipeline.workspace().join(ALIGNED_BAM_FILE).exists());
}

#[test]
fn alignment_reuses_existing_bwa_index() {
    let _guard = lock();
    let pipeline = Pipeline::new();
    pipeline.install_aligner(SORT_OK);
    fs::write(pipeline.path("ref.fa.bwt"), "").expect("bwt marker");

    pipeline
        .toolbox()
        .align_reads_bwa(&pipeline.reference(), &pipeline.path("r1.fastq"), &pipeline.path("r2.fastq"))
        .expect("alignment succeeds");

    assert_eq!(
        pipeline.calls(),
        ["bwa mem", "samtools view", "samtools sort", "samtools index"]
    );
}

#[test]
fn failing_sort_surfaces_stderr_and_keeps_intermediates() {
    let _guard = lock();
    let pipeline = Pipeline::new();
    pipeline.install_aligner("echo 'sort: truncated file' >&2; exit 1");

    let err = pipeline
        .toolbox()
        .align_reads_bwa(&pipeline.reference(), &pipeline.path("r1.fastq"), &pipeline.path("r2.fastq"))
        .unwrap_err();

    match err {
        ToolError::ExternalProcess { tool, stderr, .. } => {
            assert_eq!(tool, "samtools sort");
            assert_eq!(stderr, "sort: truncated file");
        }
        other => panic!("expected a samtools sort failure, got {other}"),
    }
    assert_eq!(pipeline.calls().last().map(String::as_str), Some("samtools sort"));
    assert!(pipeline.workspace().join(ALIGNED_SAM_FILE).exists());
    assert!(pipeline.workspace().join(ALIGNED_BAM_FILE).exists());
    assert!(!pipeline.workspace().join(SORTED_BAM_FILE).exists());
}

#[test]
fn variant_calling_builds_faidx_pipes_and_indexes() {
    let _guard = lock();
    let pipeline = Pipeline::new();
    pipeline.install_caller("echo pileup");
    let bam = pipeline.path("fixture.sorted.bam");

    let vcf = pipeline
        .toolbox()
        .call_variants_bcftools(&bam, &pipeline.reference())
        .expect("variant calling succeeds");

    assert_eq!(vcf, pipeline.workspace().join("variants.vcf.gz"));
    let calls = pipeline.calls();
    assert_eq!(calls.first().map(String::as_str), Some("samtools faidx"));
    assert_eq!(calls.last().map(String::as_str), Some("bcftools index"));
    let mut piped = calls[1..calls.len() - 1].to_vec();
    piped.sort();
    assert_eq!(piped, ["bcftools call", "bcftools mpileup"]);
    assert!(pipeline.log_text().contains("bcftools call -mv -Oz -o "));
    assert!(Path::new(&format!("{}.csi", vcf.display())).exists());
}

#[test]
fn variant_calling_reuses_existing_faidx() {
    let _guard = lock();
    let pipeline = Pipeline::new();
    pipeline.install_caller("echo pileup");
    fs::write(pipeline.path("ref.fa.fai"), "chr1\t10\t6\t10\t11\n").expect("fai");

    pipeline
        .toolbox()
        .call_variants_bcftools(&pipeline.path("fixture.sorted.bam"), &pipeline.reference())
        .expect("variant calling succeeds");

    assert!(!pipeline.calls().iter().any(|call| call == "samtools faidx"));
}

#[test]
fn failing_mpileup_is_reported_with_its_own_stderr() {
    let _guard = lock();
    let pipeline = Pipeline::new();
    pipeline.install_caller("echo 'mpileup: reference mismatch' >&2; exit 2");

    let err = pipeline
        .toolbox()
        .call_variants_bcftools(&pipeline.path("fixture.sorted.bam"), &pipeline.reference())
        .unwrap_err();

    match err {
        ToolError::ExternalProcess { tool, stderr, .. } => {
            assert_eq!(tool, "bcftools mpileup");
            assert_eq!(stderr, "mpileup: reference mismatch");
        }
        other => panic!("expected a bcftools mpileup failure, got {other}"),
    }
    assert!(!pipeline.calls().iter().any(|call| call == "bcftools index"));
}
