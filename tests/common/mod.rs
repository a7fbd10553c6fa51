#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use biogen::{ToolConfig, Toolbox};

fn snapshot_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
}

pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_root().join(name);
    if std::env::var("BIOGEN_UPDATE_SNAPSHOTS").is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {:?} not found", path));
    if normalize(&expected) != normalize(actual) {
        panic!(
            "Snapshot mismatch for {:?}. Set BIOGEN_UPDATE_SNAPSHOTS=1 to regenerate.\nExpected:\n{}\nActual:\n{}",
            path,
            expected,
            actual
        );
    }
}

fn normalize(input: &str) -> String {
    input.replace("\r\n", "\n")
}

/// Toolbox writing into `<dir>/workspace` with seeds under `<dir>/seeds`.
pub fn toolbox_in(dir: &Path) -> Toolbox {
    Toolbox::new(ToolConfig::new(dir.join("workspace"), dir.join("seeds")))
}

/// Write a FASTA file with one record per `(id, sequence)` pair.
pub fn write_fasta(path: &Path, records: &[(&str, &str)]) {
    let mut text = String::new();
    for (id, sequence) in records {
        text.push('>');
        text.push_str(id);
        text.push('\n');
        text.push_str(sequence);
        text.push('\n');
    }
    fs::write(path, text).expect("write FASTA");
}
