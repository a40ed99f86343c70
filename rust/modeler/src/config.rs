// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model store configuration, optionally loaded from environment variables.

use std::str::FromStr;

/// How a pool decides that a new payload matches a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// A checksum match only nominates candidates; full equality decides.
    #[default]
    Verify,
    /// A checksum match is taken as identity. Faster on large payloads, but a
    /// 32-bit collision silently merges two different payloads.
    TrustChecksum,
}

impl FromStr for DedupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verify" => Ok(DedupPolicy::Verify),
            "trust" | "trust-checksum" => Ok(DedupPolicy::TrustChecksum),
            other => Err(format!("unknown dedup policy '{other}'")),
        }
    }
}

/// Model store configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Match policy used by both payload pools.
    pub dedup_policy: DedupPolicy,
    /// Initial capacity of the geometry pool.
    pub geometry_capacity: usize,
    /// Initial capacity of the materials pool.
    pub materials_capacity: usize,
    /// Initial capacity of the mesh map.
    pub mesh_capacity: usize,
}

impl ModelConfig {
    pub const DEFAULT_GEOMETRY_CAPACITY: usize = 64;
    pub const DEFAULT_MATERIALS_CAPACITY: usize = 16;
    pub const DEFAULT_MESH_CAPACITY: usize = 256;
    /// Upper bound for any configured initial capacity.
    pub const MAX_CAPACITY: usize = 1 << 20;

    /// Built-in defaults, independent of the environment.
    pub fn new() -> Self {
        Self {
            dedup_policy: DedupPolicy::Verify,
            geometry_capacity: Self::DEFAULT_GEOMETRY_CAPACITY,
            materials_capacity: Self::DEFAULT_MATERIALS_CAPACITY,
            mesh_capacity: Self::DEFAULT_MESH_CAPACITY,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let dedup_policy = match lookup("NODECAD_DEDUP_POLICY") {
            Some(raw) => raw.parse::<DedupPolicy>().unwrap_or_else(|err: String| {
                tracing::warn!(error = %err, "Ignoring NODECAD_DEDUP_POLICY");
                DedupPolicy::Verify
            }),
            None => DedupPolicy::Verify,
        };
        let capacity = |name: &str, default: usize| {
            let requested = lookup(name)
                .unwrap_or_else(|| default.to_string())
                .parse()
                .unwrap_or(default);
            if requested > Self::MAX_CAPACITY {
                tracing::warn!(
                    variable = name,
                    requested,
                    max = Self::MAX_CAPACITY,
                    "Clamping initial capacity"
                );
                return Self::MAX_CAPACITY;
            }
            requested
        };

        Self {
            dedup_policy,
            geometry_capacity: capacity(
                "NODECAD_GEOMETRY_CAPACITY",
                Self::DEFAULT_GEOMETRY_CAPACITY,
            ),
            materials_capacity: capacity(
                "NODECAD_MATERIALS_CAPACITY",
                Self::DEFAULT_MATERIALS_CAPACITY,
            ),
            mesh_capacity: capacity("NODECAD_MESH_CAPACITY", Self::DEFAULT_MESH_CAPACITY),
        }
    }

    pub fn with_dedup_policy(mut self, policy: DedupPolicy) -> Self {
        self.dedup_policy = policy;
        self
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: FxHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ModelConfig::from_lookup(|_| None);
        assert_eq!(config, ModelConfig::default());
        assert_eq!(config.dedup_policy, DedupPolicy::Verify);
    }

    #[test]
    fn reads_overrides() {
        let config = ModelConfig::from_lookup(lookup_from(&[
            ("NODECAD_DEDUP_POLICY", "Trust"),
            ("NODECAD_GEOMETRY_CAPACITY", "1024"),
            ("NODECAD_MESH_CAPACITY", "8"),
        ]));
        assert_eq!(config.dedup_policy, DedupPolicy::TrustChecksum);
        assert_eq!(config.geometry_capacity, 1024);
        assert_eq!(config.materials_capacity, ModelConfig::DEFAULT_MATERIALS_CAPACITY);
        assert_eq!(config.mesh_capacity, 8);
    }

    #[test]
    fn bad_values_fall_back() {
        let config = ModelConfig::from_lookup(lookup_from(&[
            ("NODECAD_DEDUP_POLICY", "sometimes"),
            ("NODECAD_MATERIALS_CAPACITY", "lots"),
        ]));
        assert_eq!(config.dedup_policy, DedupPolicy::Verify);
        assert_eq!(config.materials_capacity, ModelConfig::DEFAULT_MATERIALS_CAPACITY);
    }

    #[test]
    fn huge_capacities_are_clamped() {
        let config = ModelConfig::from_lookup(lookup_from(&[
            ("NODECAD_GEOMETRY_CAPACITY", "18446744073709551615"),
            ("NODECAD_MATERIALS_CAPACITY", "1048577"),
            ("NODECAD_MESH_CAPACITY", "1048576"),
        ]));
        assert_eq!(config.geometry_capacity, ModelConfig::MAX_CAPACITY);
        assert_eq!(config.materials_capacity, ModelConfig::MAX_CAPACITY);
        assert_eq!(config.mesh_capacity, ModelConfig::MAX_CAPACITY);

        let model = crate::Model::with_config(config);
        assert!(model.is_empty());
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("verify".parse::<DedupPolicy>(), Ok(DedupPolicy::Verify));
        assert_eq!(
            " trust-checksum ".parse::<DedupPolicy>(),
            Ok(DedupPolicy::TrustChecksum)
        );
        assert!("".parse::<DedupPolicy>().is_err());
    }
}
