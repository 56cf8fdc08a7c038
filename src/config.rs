// Runtime configuration
// Read from the environment, after `.env` has been loaded by the binary

use std::path::PathBuf;

use crate::auth::password::DEFAULT_COST;

/// Where the roster is kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres { database_url: String },
    JsonFile { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub storage: StorageBackend,
    pub root_password: String,
    pub hash_cost: u32,
}

impl Settings {
    /// Builds settings from process environment variables
    ///
    /// - `DATABASE_URL` selects Postgres
    /// - otherwise `PERSONNEL_DATA_FILE` (default `personnel.json`)
    /// - `PERSONNEL_ROOT_PASSWORD` (default `toor`)
    /// - `PERSONNEL_BCRYPT_COST` (default bcrypt's)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let storage = match lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            Some(database_url) => StorageBackend::Postgres { database_url },
            None => {
                let path = lookup("PERSONNEL_DATA_FILE").unwrap_or_else(|| {
                    tracing::warn!("DATABASE_URL not set, using JSON file store");
                    "personnel.json".to_string()
                });
                StorageBackend::JsonFile { path: path.into() }
            }
        };

        let root_password = lookup("PERSONNEL_ROOT_PASSWORD").unwrap_or_else(|| "toor".to_string());

        let hash_cost = match lookup("PERSONNEL_BCRYPT_COST") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid PERSONNEL_BCRYPT_COST, using default");
                DEFAULT_COST
            }),
            None => DEFAULT_COST,
        };

        Self {
            storage,
            root_password,
            hash_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_json_file() {
        let settings = settings(&[]);

        assert_eq!(
            settings.storage,
            StorageBackend::JsonFile {
                path: PathBuf::from("personnel.json")
            }
        );
        assert_eq!(settings.root_password, "toor");
        assert_eq!(settings.hash_cost, DEFAULT_COST);
    }

    #[test]
    fn database_url_selects_postgres() {
        let settings = settings(&[("DATABASE_URL", "postgresql://localhost/personnel")]);

        assert!(matches!(settings.storage, StorageBackend::Postgres { .. }));
    }

    #[test]
    fn empty_database_url_is_ignored() {
        let settings = settings(&[("DATABASE_URL", ""), ("PERSONNEL_DATA_FILE", "/tmp/m2l.json")]);

        assert_eq!(
            settings.storage,
            StorageBackend::JsonFile {
                path: PathBuf::from("/tmp/m2l.json")
            }
        );
    }

    #[test]
    fn invalid_cost_falls_back_to_default() {
        assert_eq!(settings(&[("PERSONNEL_BCRYPT_COST", "lots")]).hash_cost, DEFAULT_COST);
        assert_eq!(settings(&[("PERSONNEL_BCRYPT_COST", "5")]).hash_cost, 5);
    }
}
