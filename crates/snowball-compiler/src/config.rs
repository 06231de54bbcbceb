//! Output options for one compilation unit.

use snowball_core::{Encoding, NameKind};

const DEFAULT_CPP_NAMESPACE: &str = "Snowball";
const DEFAULT_CPP_PARENT_CLASS: &str = "Stemmer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Target {
    #[default]
    C,
    Cpp,
}

impl Target {
    /// Variable kinds that may be stored as routine locals.
    ///
    /// Strings need explicit allocation and release, so they always live in
    /// the per-instance state.
    pub fn localises(self, kind: NameKind) -> bool {
        match self {
            Target::C | Target::Cpp => matches!(kind, NameKind::Boolean | NameKind::Integer),
        }
    }
}

/// Compilation options.
///
/// ```
/// use snowball_compiler::{Config, Target};
///
/// let config = Config::new("english").target(Target::Cpp).comments(true);
/// assert_eq!(config.class_name(), "English");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub target: Target,
    pub encoding: Encoding,
    /// Emit a comment with the source line before each command.
    pub comments: bool,
    /// Leaf name of the output files, without extension.
    pub output_leaf: String,
    /// Class name for C++. Derived from the output leaf when unset.
    pub name: Option<String>,
    /// Prepended to the C names of externals and of `create_env`/`close_env`.
    pub externals_prefix: String,
    /// When set, accessor functions named with this prefix are emitted for
    /// every shared variable.
    pub variables_prefix: Option<String>,
    /// Directory of `snowball_runtime.h` in the generated `#include`.
    pub runtime_path: Option<String>,
    /// Header included at the top of the generated source instead of the
    /// runtime one.
    pub cheader: Option<String>,
    /// Header included at the top of the generated interface.
    pub hheader: Option<String>,
    pub package: String,
    pub parent_class: String,
    /// Source file name quoted in the banner.
    pub source_name: Option<String>,
}

impl Config {
    pub fn new(output_leaf: impl Into<String>) -> Self {
        Self {
            target: Target::C,
            encoding: Encoding::SingleByte,
            comments: false,
            output_leaf: output_leaf.into(),
            name: None,
            externals_prefix: String::new(),
            variables_prefix: None,
            runtime_path: None,
            cheader: None,
            hheader: None,
            package: DEFAULT_CPP_NAMESPACE.to_owned(),
            parent_class: DEFAULT_CPP_PARENT_CLASS.to_owned(),
            source_name: None,
        }
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn comments(mut self, value: bool) -> Self {
        self.comments = value;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn externals_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.externals_prefix = prefix.into();
        self
    }

    pub fn variables_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.variables_prefix = Some(prefix.into());
        self
    }

    pub fn runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = Some(path.into());
        self
    }

    pub fn cheader(mut self, header: impl Into<String>) -> Self {
        self.cheader = Some(header.into());
        self
    }

    pub fn hheader(mut self, header: impl Into<String>) -> Self {
        self.hheader = Some(header.into());
        self
    }

    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn parent_class(mut self, class: impl Into<String>) -> Self {
        self.parent_class = class.into();
        self
    }

    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn is_utf8(&self) -> bool {
        self.encoding == Encoding::Utf8
    }

    pub fn is_cpp(&self) -> bool {
        self.target == Target::Cpp
    }

    /// The C++ class name: the configured name, or the output leaf with
    /// its first letter and every letter after `_` or `-` upper-cased.
    pub fn class_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let stem = self.output_leaf.split('.').next().unwrap_or_default();
        let mut out = String::with_capacity(stem.len());
        let mut upper_next = true;
        for c in stem.chars() {
            if c == '_' || c == '-' {
                upper_next = true;
            } else if upper_next {
                out.extend(c.to_uppercase());
                upper_next = false;
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("stem")
    }
}
