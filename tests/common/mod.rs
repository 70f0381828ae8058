#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Semicolon upload with textual outcome labels.
pub const TEXTUAL_UPLOAD: &str =
    "campaign;persona;resultado;previousy\nX;Buyer;sucesso;sim\nX;Buyer;falha;nao\n";

/// Tab upload with numeric outcome and contact counts.
pub const NUMERIC_UPLOAD: &str = "Campaign\tPersona\tResultado\tPrevious\tregion\n\
A\tSaver\t1\t3\tnorth\n\
A\tBuyer\t0\t0\tsouth\n\
B\tSaver\t1\t0\tsouth\n\
B\t  \t1\t1\teast\n";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    /// Writes raw bytes, for uploads in encodings other than UTF-8.
    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }
}
