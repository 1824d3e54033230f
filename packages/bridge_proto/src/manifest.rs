//! The procedure manifest: which procedures exist at which namespace paths,
//! and the declared order of their parameter names.
//!
//! The host serializes the manifest as one JSON string per namespace so the
//! UI side can marshal positional arguments into the named-parameter objects
//! the transport expects. Once parsed the manifest is read-only for the
//! client's entire lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ManifestError;

/// Ordered parameter names for a single procedure. Index = positional order.
pub type ParamNames = Arc<[String]>;

/// Read-only map from namespace path to that namespace's procedure table.
///
/// Namespace paths are dot-joined identifier segments; the root namespace is
/// the empty string. A procedure with no parameters maps to an empty list.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    namespaces: HashMap<String, HashMap<String, ParamNames>>,
}

impl Manifest {
    /// Decode the serialized form: one JSON string per namespace, each
    /// decoding to `{procedure: [param, ...]}`.
    ///
    /// Malformed JSON in any namespace fails the whole parse.
    pub fn parse(raw: &HashMap<String, String>) -> Result<Self, ManifestError> {
        let mut namespaces = HashMap::with_capacity(raw.len());
        for (namespace, encoded) in raw {
            let table: HashMap<String, Vec<String>> =
                serde_json::from_str(encoded).map_err(|source| {
                    ManifestError::InvalidNamespace {
                        namespace: namespace.clone(),
                        source,
                    }
                })?;
            namespaces.insert(namespace.clone(), freeze_table(table));
        }
        Ok(Self { namespaces })
    }

    /// Build from already-materialized tables, for callers that embed the
    /// manifest directly instead of fetching it.
    pub fn from_tables(tables: HashMap<String, HashMap<String, Vec<String>>>) -> Self {
        let namespaces = tables
            .into_iter()
            .map(|(namespace, table)| (namespace, freeze_table(table)))
            .collect();
        Self { namespaces }
    }

    /// Procedure table declared at `namespace`, if any.
    pub fn procedures(&self, namespace: &str) -> Option<&HashMap<String, ParamNames>> {
        self.namespaces.get(namespace)
    }

    /// Parameter names of `proc_name` declared directly under `namespace`.
    pub fn params(&self, namespace: &str, proc_name: &str) -> Option<ParamNames> {
        self.namespaces.get(namespace)?.get(proc_name).cloned()
    }

    /// Parameter names for a fully-qualified dotted path (`"greet"`,
    /// `"math.add"`, ...). Root-level procedures have no dot.
    pub fn params_for_path(&self, path: &str) -> Option<ParamNames> {
        let (namespace, leaf) = split_leaf(path);
        self.params(namespace, leaf)
    }

    /// Whether `key` addresses a namespace: either an exact namespace key,
    /// or a strict dotted prefix of one (`"api"` when only `"api.ui"` is
    /// declared). The root (empty key) is always a namespace.
    pub fn is_namespace(&self, key: &str) -> bool {
        if key.is_empty() || self.namespaces.contains_key(key) {
            return true;
        }
        self.namespaces
            .keys()
            .any(|declared| declared.len() > key.len() + 1 && declared.starts_with(key) && declared.as_bytes()[key.len()] == b'.')
    }

    /// Number of declared namespaces.
    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }
}

fn freeze_table(table: HashMap<String, Vec<String>>) -> HashMap<String, ParamNames> {
    table
        .into_iter()
        .map(|(proc_name, params)| (proc_name, ParamNames::from(params)))
        .collect()
}

/// Split a fully-qualified path into (namespace, leaf procedure name).
pub fn split_leaf(path: &str) -> (&str, &str) {
    match path.rsplit_once('.') {
        Some((namespace, leaf)) => (namespace, leaf),
        None => ("", path),
    }
}

/// The two accepted manifest inputs: the serialized per-namespace form the
/// host ships over the wire, or tables built directly in memory.
#[derive(Debug, Clone)]
pub enum ManifestSource {
    /// `{namespacePath: json-string-of {procedure: [param, ...]}}`
    Raw(HashMap<String, String>),
    /// Already-decoded tables.
    Tables(HashMap<String, HashMap<String, Vec<String>>>),
}

impl ManifestSource {
    pub fn into_manifest(self) -> Result<Manifest, ManifestError> {
        match self {
            ManifestSource::Raw(raw) => Manifest::parse(&raw),
            ManifestSource::Tables(tables) => Ok(Manifest::from_tables(tables)),
        }
    }
}

impl From<HashMap<String, String>> for ManifestSource {
    fn from(raw: HashMap<String, String>) -> Self {
        ManifestSource::Raw(raw)
    }
}

impl From<HashMap<String, HashMap<String, Vec<String>>>> for ManifestSource {
    fn from(tables: HashMap<String, HashMap<String, Vec<String>>>) -> Self {
        ManifestSource::Tables(tables)
    }
}
