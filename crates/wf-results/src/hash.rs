//! Content-based hashing for run IDs.

use crate::types::InputDigest;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Hex SHA-256 of raw bytes.
pub fn digest_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Run id from the serialized configuration, the input digests and the
/// pipeline version. Identical inputs always map to the same id.
pub fn compute_run_id<C: Serialize>(
    config: &C,
    inputs: &[InputDigest],
    pipeline_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());

    for input in inputs {
        hasher.update(input.name.as_bytes());
        hasher.update(input.sha256.as_bytes());
    }

    hasher.update(pipeline_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Cfg {
        step_psi: f64,
    }

    fn inputs(scada: &[u8]) -> Vec<InputDigest> {
        vec![
            InputDigest {
                name: "scada".to_string(),
                sha256: digest_bytes(scada),
            },
            InputDigest {
                name: "well_tests".to_string(),
                sha256: digest_bytes(b"MPB-28,2024-04-01,500"),
            },
        ]
    }

    #[test]
    fn hash_stability() {
        let cfg = Cfg { step_psi: 10.0 };
        let a = compute_run_id(&cfg, &inputs(b"rows"), "v1");
        let b = compute_run_id(&cfg, &inputs(b"rows"), "v1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let cfg = Cfg { step_psi: 10.0 };
        let base = compute_run_id(&cfg, &inputs(b"rows"), "v1");

        assert_ne!(base, compute_run_id(&cfg, &inputs(b"other rows"), "v1"));
        assert_ne!(base, compute_run_id(&Cfg { step_psi: 5.0 }, &inputs(b"rows"), "v1"));
        assert_ne!(base, compute_run_id(&cfg, &inputs(b"rows"), "v2"));
    }

    #[test]
    fn digest_known_value() {
        assert_eq!(
            digest_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
