//! Worker registry: the named load-generator endpoints a run fans out to.
use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::RegistryError;


/// A remote load generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worker {
    name: String,
    endpoint: String,
    base_url: Url,
}

impl Worker {
    /// Validate and build a worker.
    ///
    /// `endpoint` is either `host:port` or a full `http(s)://host:port` base.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint is empty or cannot be parsed.
    pub fn new(name: &str, endpoint: &str) -> Result<Self, RegistryError> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(RegistryError::EmptyEndpoint {
                name: name.to_owned(),
            });
        }
        let raw = if endpoint.contains("://") {
            endpoint.to_owned()
        } else {
            format!("http://{}", endpoint)
        };
        let base_url = Url::parse(&raw).map_err(|source| RegistryError::InvalidEndpoint {
            name: name.to_owned(),
            endpoint: endpoint.to_owned(),
            source,
        })?;
        if base_url.host_str().is_none_or(str::is_empty) {
            return Err(RegistryError::InvalidEndpoint {
                name: name.to_owned(),
                endpoint: endpoint.to_owned(),
                source: url::ParseError::EmptyHost,
            });
        }
        Ok(Self {
            name: name.to_owned(),
            endpoint: endpoint.to_owned(),
            base_url,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Endpoint as written in the client list.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// File name the worker's result is stored under.
    #[must_use]
    pub fn result_file_name(&self) -> String {
        format!("{}.json", self.name)
    }
}

#[derive(Debug, Deserialize)]
struct ClientEntry {
    #[serde(default)]
    name: String,
    #[serde(default, alias = "endpoint")]
    uri: String,
}

/// Validated name -> worker mapping, iterated in name order.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    workers: BTreeMap<String, Worker>,
}

impl ClientRegistry {
    /// Load a JSON client list: an array of `{ "name": ..., "uri": ... }`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed, when it is
    /// empty, or when any entry is invalid (see [`ClientRegistry::from_pairs`]).
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<ClientEntry> =
            serde_json::from_slice(&content).map_err(|source| RegistryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if entries.is_empty() {
            return Err(RegistryError::Empty {
                path: path.to_path_buf(),
            });
        }
        let registry = Self::from_pairs(
            entries
                .iter()
                .map(|entry| (entry.name.as_str(), entry.uri.as_str())),
        )?;
        tracing::debug!(
            "Loaded {} client(s) from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Build a registry from `(name, endpoint)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error for empty names, names that are not usable as a file
    /// stem, empty or unparseable endpoints, and duplicate names.
    pub fn from_pairs<'entry, I>(pairs: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (&'entry str, &'entry str)>,
    {
        let mut workers = BTreeMap::new();
        for (index, (name, endpoint)) in pairs.into_iter().enumerate() {
            let name = name.trim();
            if name.is_empty() {
                return Err(RegistryError::EmptyName { index });
            }
            if !is_safe_file_stem(name) {
                return Err(RegistryError::UnsafeName {
                    name: name.to_owned(),
                });
            }
            if workers.contains_key(name) {
                return Err(RegistryError::DuplicateName {
                    name: name.to_owned(),
                });
            }
            let worker = Worker::new(name, endpoint)?;
            workers.insert(name.to_owned(), worker);
        }
        Ok(Self { workers })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Worker> {
        self.workers.get(name)
    }

    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.workers.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

fn is_safe_file_stem(name: &str) -> bool {
    name != "."
        && name != ".."
        && !name
            .chars()
            .any(|ch| matches!(ch, '/' | '\\' | '\0') || ch.is_control())
}
