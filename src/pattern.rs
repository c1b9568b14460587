use crate::LoadError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, io::Read, path::Path};

/// Kernel assumed when a pattern does not name one
pub const DEFAULT_KERNEL: &str = "gather";

/// Combined gather-scatter kernel: one read and one write per element
pub const GATHER_SCATTER_KERNEL: &str = "gs";

/// Kernels understood by the Spatter request generator
pub const KNOWN_KERNELS: [&str; 5] = ["gather", "scatter", "gs", "multigather", "multiscatter"];

/// One entry of a Spatter pattern list
///
/// Only the kernel type matters here; the remaining pattern fields
/// (`pattern`, `delta`, `count`, ...) are accepted and ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternDescriptor {
    #[serde(default)]
    pub kernel: Option<String>,
}

impl PatternDescriptor {
    /// Lower-cased kernel label, falling back to [`DEFAULT_KERNEL`]
    pub fn kernel_label(&self) -> String {
        match &self.kernel {
            Some(kernel) => kernel.to_lowercase(),
            None => DEFAULT_KERNEL.to_string(),
        }
    }
}

pub fn is_gather_scatter(label: &str) -> bool {
    label == GATHER_SCATTER_KERNEL
}

/// Parse a JSON pattern list into kernel labels, one per configuration
pub fn read_kernels<R: Read>(reader: R) -> Result<Vec<String>, LoadError> {
    let patterns: Vec<PatternDescriptor> = serde_json::from_reader(reader)?;

    let kernels: Vec<String> = patterns.iter().map(|p| p.kernel_label()).collect();
    for (index, kernel) in kernels.iter().enumerate() {
        if !KNOWN_KERNELS.contains(&kernel.as_str()) {
            warn!("Pattern {} uses unknown kernel {:?}", index, kernel);
        }
    }
    Ok(kernels)
}

pub fn load_kernels<P: AsRef<Path>>(path: P) -> Result<Vec<String>, LoadError> {
    let path = path.as_ref();
    let kernels = read_kernels(BufReader::new(File::open(path)?))?;
    info!(
        "Loaded {} patterns from {}",
        kernels.len(),
        path.display()
    );
    Ok(kernels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kernels(json: &str) -> Vec<String> {
        read_kernels(json.as_bytes()).unwrap()
    }

    #[test]
    fn missing_kernel_defaults_to_gather() {
        assert_eq!(kernels("[{}]"), vec!["gather"]);
    }

    #[test]
    fn kernel_is_lower_cased() {
        assert_eq!(kernels(r#"[{"kernel": "GS"}, {"kernel": "Scatter"}]"#), vec!["gs", "scatter"]);
    }

    #[test]
    fn extra_pattern_fields_are_ignored() {
        let json = r#"[
            {"kernel": "Gather", "pattern": [0, 8, 16], "delta": 8, "count": 1024},
            {"pattern-gather": [0, 1], "pattern-scatter": [4, 5], "kernel": "gs"}
        ]"#;
        assert_eq!(kernels(json), vec!["gather", "gs"]);
    }

    #[test]
    fn unknown_kernel_is_kept() {
        assert_eq!(kernels(r#"[{"kernel": "Stream"}]"#), vec!["stream"]);
    }

    #[test]
    fn empty_list() {
        assert!(kernels("[]").is_empty());
    }

    #[test]
    fn rejects_non_list() {
        assert!(matches!(
            read_kernels(r#"{"kernel": "gs"}"#.as_bytes()),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn rejects_non_string_kernel() {
        assert!(matches!(
            read_kernels(r#"[{"kernel": 3}]"#.as_bytes()),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn gather_scatter_detection() {
        assert!(is_gather_scatter("gs"));
        assert!(!is_gather_scatter("gather"));
        assert!(!is_gather_scatter("multigather"));
    }
}
