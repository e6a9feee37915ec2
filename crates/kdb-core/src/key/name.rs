use std::fmt;
use std::str::FromStr;

use crate::key::error::KeyError;

/// Namespace of a key name.
///
/// Variant order is the order keys of different namespaces sort in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    /// `/a/b`: matches the key in any namespace on lookup
    Cascading,
    Spec,
    Proc,
    Dir,
    User,
    System,
    Default,
}

impl Namespace {
    /// Namespaces a cascading lookup walks, in priority order.
    pub const CASCADE_ORDER: [Namespace; 5] = [
        Namespace::Proc,
        Namespace::Dir,
        Namespace::User,
        Namespace::System,
        Namespace::Default,
    ];

    /// Prefix as written in a key name (without `:/`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Cascading => "",
            Namespace::Spec => "spec",
            Namespace::Proc => "proc",
            Namespace::Dir => "dir",
            Namespace::User => "user",
            Namespace::System => "system",
            Namespace::Default => "default",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "spec" => Some(Namespace::Spec),
            "proc" => Some(Namespace::Proc),
            "dir" => Some(Namespace::Dir),
            "user" => Some(Namespace::User),
            "system" => Some(Namespace::System),
            "default" => Some(Namespace::Default),
            _ => None,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hierarchical key name: a namespace plus path components.
///
/// Names compare by namespace first, then component by component, which puts
/// parents before their children and orders siblings lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyName {
    namespace: Namespace,
    parts: Vec<String>,
}

impl KeyName {
    /// Parses `ns:/a/b`, the cascading form `/a/b`, or the legacy `ns/a/b`.
    pub fn new(name: &str) -> Result<Self, KeyError> {
        if name.is_empty() {
            return Err(KeyError::InvalidName {
                name: name.to_string(),
                reason: "empty name".to_string(),
            });
        }

        let (namespace, path) = if let Some(path) = name.strip_prefix('/') {
            (Namespace::Cascading, path)
        } else if let Some((prefix, rest)) = name.split_once(":/") {
            let namespace = Namespace::from_prefix(prefix).ok_or_else(|| KeyError::UnknownNamespace {
                namespace: prefix.to_string(),
                name: name.to_string(),
            })?;
            (namespace, rest)
        } else {
            let (prefix, rest) = name.split_once('/').unwrap_or((name, ""));
            let namespace = Namespace::from_prefix(prefix).ok_or_else(|| KeyError::InvalidName {
                name: name.to_string(),
                reason: "name must start with '/' or a namespace".to_string(),
            })?;
            (namespace, rest)
        };

        let mut parts: Vec<String> = Vec::new();
        for part in path.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                other => parts.push(other.to_string()),
            }
        }
        Ok(Self { namespace, parts })
    }

    /// Root name of a namespace (`user:/`, or `/` for cascading).
    pub fn root(namespace: Namespace) -> Self {
        Self { namespace, parts: Vec::new() }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Last path component, `None` for a namespace root.
    pub fn base_name(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }

    /// Appends one path component, taken verbatim.
    pub fn add_base_name(&mut self, base: &str) {
        self.parts.push(base.to_string());
    }

    /// Returns this name with one more component.
    pub fn child(&self, base: &str) -> Self {
        let mut name = self.clone();
        name.add_base_name(base);
        name
    }

    /// Returns this name extended by a relative, slash-separated path.
    pub fn join(&self, relative: &str) -> Self {
        let mut name = self.clone();
        name.parts
            .extend(relative.split('/').filter(|p| !p.is_empty()).map(str::to_string));
        name
    }

    pub fn parent(&self) -> Option<Self> {
        if self.parts.is_empty() {
            return None;
        }
        let mut name = self.clone();
        name.parts.pop();
        Some(name)
    }

    pub fn with_namespace(&self, namespace: Namespace) -> Self {
        Self { namespace, parts: self.parts.clone() }
    }

    /// True if `self` is a strict descendant of `parent` in the same namespace.
    pub fn is_below(&self, parent: &KeyName) -> bool {
        self.namespace == parent.namespace
            && self.parts.len() > parent.parts.len()
            && self.parts.starts_with(&parent.parts)
    }

    pub fn is_below_or_same(&self, parent: &KeyName) -> bool {
        self == parent || self.is_below(parent)
    }

    /// Components of `self` below `parent`, if `self` is at or below it.
    pub fn relative_to(&self, parent: &KeyName) -> Option<&[String]> {
        if self.is_below_or_same(parent) {
            Some(&self.parts[parent.parts.len()..])
        } else {
            None
        }
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace != Namespace::Cascading {
            write!(f, "{}:", self.namespace)?;
        }
        write!(f, "/{}", self.parts.join("/"))
    }
}

impl FromStr for KeyName {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyName::new(s)
    }
}
