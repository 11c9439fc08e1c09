use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// A named network condition a scheme is evaluated under: one-way latency
/// plus a downlink/uplink bandwidth trace pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub latency_ms: u64,
    pub downlink_trace: PathBuf,
    pub uplink_trace: PathBuf,
}

/// The run descriptor catalog: every profile and every scheme identifier to
/// evaluate, in the order runs are executed. Built once at startup and passed
/// by reference into the runner and the analysis stages; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub profiles: Vec<Profile>,
    pub schemes: Vec<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog has no profiles")]
    NoProfiles,
    #[error("catalog has no schemes")]
    NoSchemes,
    #[error("duplicate profile id `{0}`")]
    DuplicateProfile(String),
    #[error("duplicate scheme `{0}`")]
    DuplicateScheme(String),
}

impl Catalog {
    /// The built-in evaluation matrix: two LTE profiles (driving trace at
    /// 5 ms, short trace at 200 ms) crossed with cubic, fillp_sheep and vegas.
    pub fn builtin() -> Self {
        Self {
            profiles: vec![
                Profile {
                    id: "1".to_string(),
                    name: "LTE (Low Latency)".to_string(),
                    latency_ms: 5,
                    downlink_trace: PathBuf::from("mahimahi/traces/TMobile-LTE-driving.down"),
                    uplink_trace: PathBuf::from("mahimahi/traces/TMobile-LTE-driving.up"),
                },
                Profile {
                    id: "2".to_string(),
                    name: "LTE (High Latency)".to_string(),
                    latency_ms: 200,
                    downlink_trace: PathBuf::from("mahimahi/traces/TMobile-LTE-short.down"),
                    uplink_trace: PathBuf::from("mahimahi/traces/TMobile-LTE-short.up"),
                },
            ],
            schemes: vec![
                "cubic".to_string(),
                "fillp_sheep".to_string(),
                "vegas".to_string(),
            ],
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.profiles.is_empty() {
            return Err(CatalogError::NoProfiles);
        }
        if self.schemes.is_empty() {
            return Err(CatalogError::NoSchemes);
        }
        for (i, profile) in self.profiles.iter().enumerate() {
            if self.profiles[..i].iter().any(|p| p.id == profile.id) {
                return Err(CatalogError::DuplicateProfile(profile.id.clone()));
            }
        }
        for (i, scheme) in self.schemes.iter().enumerate() {
            if self.schemes[..i].contains(scheme) {
                return Err(CatalogError::DuplicateScheme(scheme.clone()));
            }
        }
        Ok(())
    }

    pub fn profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, profile_id: &str, scheme: &str) -> bool {
        self.profile(profile_id).is_some() && self.schemes.iter().any(|s| s == scheme)
    }

    /// The full evaluation matrix in execution order: profiles outer,
    /// schemes inner.
    pub fn pairs(&self) -> impl Iterator<Item = (&Profile, &str)> {
        self.profiles
            .iter()
            .flat_map(|p| self.schemes.iter().map(move |s| (p, s.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        catalog.validate().unwrap();
        assert_eq!(catalog.profiles.len(), 2);
        assert_eq!(catalog.schemes.len(), 3);
        assert!(catalog.contains("1", "cubic"));
        assert!(catalog.contains("2", "vegas"));
        assert!(!catalog.contains("3", "cubic"));
        assert!(!catalog.contains("1", "bbr"));
    }

    #[test]
    fn pairs_iterate_profiles_outer_schemes_inner() {
        let catalog = Catalog::builtin();
        let order: Vec<(String, String)> = catalog
            .pairs()
            .map(|(p, s)| (p.id.clone(), s.to_string()))
            .collect();
        assert_eq!(order.len(), 6);
        assert_eq!(order[0], ("1".to_string(), "cubic".to_string()));
        assert_eq!(order[2], ("1".to_string(), "vegas".to_string()));
        assert_eq!(order[3], ("2".to_string(), "cubic".to_string()));
    }

    #[test]
    fn duplicate_profile_id_is_rejected() {
        let mut catalog = Catalog::builtin();
        let mut dup = catalog.profiles[0].clone();
        dup.name = "copy".to_string();
        catalog.profiles.push(dup);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::DuplicateProfile(id)) if id == "1"
        ));
    }

    #[test]
    fn catalog_parses_from_toml() {
        let doc = r#"
            schemes = ["cubic"]

            [[profiles]]
            id = "wifi"
            name = "Office WiFi"
            latency_ms = 10
            downlink_trace = "traces/wifi.down"
            uplink_trace = "traces/wifi.up"
        "#;
        let catalog: Catalog = toml::from_str(doc).unwrap();
        catalog.validate().unwrap();
        assert_eq!(catalog.profiles[0].latency_ms, 10);
        assert_eq!(catalog.schemes, vec!["cubic"]);
    }
}
