//! Routing rule data model.
//!
//! # Responsibilities
//! - Define the authored form of a rule set (`RuleSet`, `RuleSpec`)
//! - Define the validated, normalized form used by the table (`Rule`)
//! - Validate authored rules into `Rule`s
//!
//! # Design Decisions
//! - Path types are a closed enum; unknown strings are rejected at build time
//! - Backends and extension data are carried through, never interpreted
//! - Rules are values: an edited rule set replaces all of its rules

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::routing::path::{normalize_host, normalize_path};

/// Matching mode of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathType {
    Exact,
    Prefix,
    ImplementationSpecific,
}

impl PathType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathType::Exact => "Exact",
            PathType::Prefix => "Prefix",
            PathType::ImplementationSpecific => "ImplementationSpecific",
        }
    }
}

impl fmt::Display for PathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Exact" => Ok(PathType::Exact),
            "Prefix" => Ok(PathType::Prefix),
            "ImplementationSpecific" => Ok(PathType::ImplementationSpecific),
            other => Err(ValidationError::UnknownPathType(other.to_string())),
        }
    }
}

/// Port of a backend service, either numeric or named.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackendPort {
    Number(u16),
    Name(String),
}

impl fmt::Display for BackendPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendPort::Number(n) => write!(f, "{}", n),
            BackendPort::Name(name) => f.write_str(name),
        }
    }
}

/// Opaque reference to the service that should receive a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Backend {
    pub service: String,
    pub port: BackendPort,
}

impl Backend {
    pub fn new(service: impl Into<String>, port: u16) -> Self {
        Self {
            service: service.into(),
            port: BackendPort::Number(port),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service, self.port)
    }
}

/// Identity of the rule set a rule came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin {
    pub namespace: String,
    pub name: String,
    /// Creation sequence of the rule set; lower is older.
    pub created: u64,
}

impl Origin {
    /// `namespace/name`, the identifier used for lexical tie-breaks.
    pub fn id(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A rule as authored, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Empty means the catch-all host.
    #[serde(default)]
    pub host: String,

    pub path: String,

    #[serde(default = "default_path_type")]
    pub path_type: String,

    pub backend: Backend,

    /// Explicit collision override; lower wins.
    #[serde(default)]
    pub priority: Option<u32>,

    /// Passed through to the proxying layer untouched.
    #[serde(default)]
    pub extensions: BTreeMap<String, String>,
}

fn default_path_type() -> String {
    PathType::ImplementationSpecific.as_str().to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

/// An atomically admitted group of rules from one author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    pub name: String,

    /// Creation sequence; lower is older.
    #[serde(default)]
    pub created: u64,

    /// Resource version, for diagnostics only.
    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl RuleSet {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, created: u64) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            created,
            version: 0,
            rules: Vec::new(),
        }
    }

    /// Builder-style helper to append a rule.
    pub fn with_rule(
        mut self,
        host: impl Into<String>,
        path: impl Into<String>,
        path_type: PathType,
        backend: Backend,
    ) -> Self {
        self.rules.push(RuleSpec {
            host: host.into(),
            path: path.into(),
            path_type: path_type.as_str().to_string(),
            backend,
            priority: None,
            extensions: BTreeMap::new(),
        });
        self
    }

    pub fn origin(&self) -> Origin {
        Origin {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            created: self.created,
        }
    }

    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

/// A validated, normalized routable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub host: String,
    pub path: String,
    pub path_type: PathType,
    pub backend: Backend,
    pub origin: Origin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, String>,
}

impl Rule {
    /// Validate an authored rule.
    pub fn from_spec(spec: &RuleSpec, origin: &Origin) -> Result<Self, ValidationError> {
        if spec.path.is_empty() {
            return Err(ValidationError::EmptyPath);
        }
        if !spec.path.starts_with('/') {
            return Err(ValidationError::MissingLeadingSlash(spec.path.clone()));
        }
        if spec.path.contains(['?', '#']) {
            return Err(ValidationError::QueryOrFragment(spec.path.clone()));
        }
        let path_type = spec.path_type.parse::<PathType>()?;

        Ok(Self {
            host: normalize_host(&spec.host),
            path: normalize_path(&spec.path),
            path_type,
            backend: spec.backend.clone(),
            origin: origin.clone(),
            priority: spec.priority,
            extensions: spec.extensions.clone(),
        })
    }

    pub fn is_fallback(&self) -> bool {
        self.host.is_empty()
    }
}

/// Why an authored rule was excluded from the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("path must not be empty")]
    EmptyPath,

    #[error("path {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    #[error("path {0:?} must not carry a query or fragment")]
    QueryOrFragment(String),

    #[error("unrecognized path type {0:?}")]
    UnknownPathType(String),
}

impl ValidationError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::EmptyPath => "empty_path",
            ValidationError::MissingLeadingSlash(_) => "missing_leading_slash",
            ValidationError::QueryOrFragment(_) => "query_or_fragment",
            ValidationError::UnknownPathType(_) => "unknown_path_type",
        }
    }
}
