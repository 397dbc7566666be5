//! Multi-document YAML output

use crate::error::Result;
use crate::manifest::ManifestSet;
use serde::Serialize;
use std::io::Write;

/// Document separator line
pub const SEPARATOR: &str = "---";

/// Writes manifests as one YAML stream
///
/// A `---` line goes before every document except the first, so a single
/// pod spec comes out as Deployment, `---`, HPA and, when load balanced,
/// `---`, Service.
pub struct ManifestWriter<W: Write> {
    out: W,
    documents: usize,
}

impl<W: Write> ManifestWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, documents: 0 }
    }

    /// Number of documents written so far
    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn write_document<T: Serialize>(&mut self, document: &T) -> Result<()> {
        let yaml = serde_yaml::to_string(document)?;
        if self.documents > 0 {
            writeln!(self.out, "{}", SEPARATOR)?;
        }
        self.out.write_all(yaml.as_bytes())?;
        self.documents += 1;
        Ok(())
    }

    pub fn write_set(&mut self, set: &ManifestSet) -> Result<()> {
        self.write_document(&set.deployment)?;
        self.write_document(&set.autoscaler)?;
        if let Some(ref service) = set.service {
            self.write_document(service)?;
        }
        Ok(())
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
