use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{ErrorContext, Result};

/// Opaque content digest. Equal fingerprints mean byte-identical content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Full lowercase hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 characters) for display purposes
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        &self.0[..end]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint an in-memory buffer
pub fn compute_content_hash(content: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let digest = hasher.finalize();
    Fingerprint(format!("{:x}", digest))
}

/// Fingerprint everything a reader yields, without buffering it whole
pub fn compute_reader_hash<R: io::Read>(reader: &mut R) -> io::Result<Fingerprint> {
    let mut hasher = Sha256::new();
    io::copy(reader, &mut hasher)?;
    let digest = hasher.finalize();
    Ok(Fingerprint(format!("{:x}", digest)))
}

/// Fingerprint the contents of a file on disk. The file is closed on return.
pub fn compute_file_hash(path: &Path) -> Result<Fingerprint> {
    let mut file = File::open(path)
        .with_io_context(|| format!("opening {}", path.display()))?;
    compute_reader_hash(&mut file)
        .with_io_context(|| format!("hashing {}", path.display()))
}
