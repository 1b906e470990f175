//! Registry of which format handlers are usable in this process.
//!
//! Library-backed formats are compiled in or out through cargo features;
//! RTF depends on an external filter binary that is probed once. The
//! registry is immutable after construction, so it can be shared freely
//! between concurrent conversions.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use crate::detect::FormatKind;
use crate::tool::{ToolCommand, DEFAULT_PANDOC};

/// The filter must answer `--version` within this limit to count as present.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Availability of each format handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRegistry {
    available: BTreeMap<FormatKind, bool>,
}

impl CapabilityRegistry {
    /// Probe every optional dependency once.
    ///
    /// `pandoc` is the RTF filter binary to look for.
    pub fn probe(pandoc: &Path) -> Self {
        let mut available = BTreeMap::new();
        available.insert(FormatKind::PlainText, true);
        available.insert(FormatKind::PassthroughPdf, true);
        available.insert(FormatKind::Csv, cfg!(feature = "csv"));
        available.insert(FormatKind::Html, cfg!(feature = "html"));
        available.insert(FormatKind::Docx, cfg!(feature = "docx"));
        available.insert(FormatKind::Xlsx, cfg!(feature = "xlsx"));
        available.insert(FormatKind::Pptx, cfg!(feature = "pptx"));
        available.insert(FormatKind::Rtf, probe_binary(pandoc));

        for (kind, ok) in &available {
            if !ok {
                log::warn!("{} support unavailable", kind);
            }
        }
        Self { available }
    }

    /// Process-wide registry, probed on first use with the default filter path.
    ///
    /// Later calls never re-probe, even if the probe failed.
    pub fn global() -> &'static CapabilityRegistry {
        static GLOBAL: OnceLock<CapabilityRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| Self::probe(Path::new(DEFAULT_PANDOC)))
    }

    /// Registry with every supported kind marked available.
    pub fn all_available() -> Self {
        Self {
            available: FormatKind::SUPPORTED.iter().map(|k| (*k, true)).collect(),
        }
    }

    /// Override one entry.
    pub fn with(mut self, kind: FormatKind, available: bool) -> Self {
        if kind != FormatKind::Unsupported {
            self.available.insert(kind, available);
        }
        self
    }

    /// Whether the handler for `kind` can be used.
    pub fn is_available(&self, kind: FormatKind) -> bool {
        self.available.get(&kind).copied().unwrap_or(false)
    }

    /// Snapshot of all entries, keyed by kind.
    pub fn entries(&self) -> &BTreeMap<FormatKind, bool> {
        &self.available
    }
}

fn probe_binary(program: &Path) -> bool {
    match ToolCommand::new(program).arg("--version").run(None, PROBE_TIMEOUT) {
        Ok(_) => {
            log::debug!("found {}", program.display());
            true
        }
        Err(e) => {
            log::debug!("probe of {} failed: {}", program.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_formats_always_available() {
        let registry = CapabilityRegistry::probe(Path::new("/nonexistent/pandoc"));
        assert!(registry.is_available(FormatKind::PlainText));
        assert!(registry.is_available(FormatKind::PassthroughPdf));
        assert!(!registry.is_available(FormatKind::Rtf));
        assert!(!registry.is_available(FormatKind::Unsupported));
    }

    #[test]
    fn test_feature_gated_formats() {
        let registry = CapabilityRegistry::probe(Path::new("/nonexistent/pandoc"));
        assert_eq!(registry.is_available(FormatKind::Csv), cfg!(feature = "csv"));
        assert_eq!(registry.is_available(FormatKind::Xlsx), cfg!(feature = "xlsx"));
    }

    #[test]
    fn test_override() {
        let registry = CapabilityRegistry::all_available().with(FormatKind::Xlsx, false);
        assert!(!registry.is_available(FormatKind::Xlsx));
        assert!(registry.is_available(FormatKind::Docx));

        let registry = registry.with(FormatKind::Unsupported, true);
        assert!(!registry.is_available(FormatKind::Unsupported));
    }

    #[test]
    fn test_global_is_stable() {
        let first = CapabilityRegistry::global() as *const _;
        let second = CapabilityRegistry::global() as *const _;
        assert_eq!(first, second);
    }
}
