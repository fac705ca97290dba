//! Dump options, the process-wide default and TOML loading.
//!
//! [`Options`] is read-only for the duration of a render. The process-wide
//! default behind [`config`] is what the free functions [`dump`], [`sdump`]
//! and [`fdump`] use; prefer calling the same methods on an explicit
//! `Options` value so nothing depends on shared state.
//!
//! [`dump`]: crate::dump
//! [`sdump`]: crate::sdump
//! [`fdump`]: crate::fdump

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DumpError, DumpResult};
use crate::value::{Field, Value};

/// Custom inclusion predicate for record fields.
pub type FieldFilter = Arc<dyn Fn(&Field) -> bool + Send + Sync>;

/// Global formatting hook. Returns `true` when it wrote a representation of
/// the value, `false` to let the regular rendering proceed.
pub type DumpFunc = Arc<dyn Fn(&Value, &mut dyn io::Write) -> bool + Send + Sync>;

/// Prefix of fields generated by protobuf code generators.
const GENERATED_FIELD_PATTERN: &str = "^XXX_.*$";

/// Formatting policy for one render.
#[derive(Clone)]
pub struct Options {
    /// No indentation or newlines; labels are written inline as `/*p0*/`.
    pub compact: bool,
    /// Remove every package qualifier from type names.
    pub strip_package_names: bool,
    /// Skip non-exported record fields.
    pub hide_private_fields: bool,
    /// Skip record fields holding their type's zero value.
    pub hide_zero_values: bool,
    /// Skip record fields whose name matches.
    pub field_exclusions: Option<Regex>,
    /// Skip record fields the predicate rejects.
    pub field_filter: Option<FieldFilter>,
    /// Package whose qualifier is elided from type names.
    pub home_package: Option<String>,
    /// Written between top-level arguments.
    pub separator: String,
    /// Render references as expressions that stay valid source code.
    pub strict_go: bool,
    /// Consulted before anything else for every non-nil value.
    pub dump_func: Option<DumpFunc>,
    /// Print shared but acyclic values in full at every occurrence. Cycles
    /// are still collapsed to their label.
    pub disable_pointer_replacement: bool,
    /// Print date/time values as a `time.Date(...)` constructor in UTC.
    pub format_time: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            compact: false,
            strip_package_names: false,
            hide_private_fields: true,
            hide_zero_values: false,
            field_exclusions: Some(
                Regex::new(GENERATED_FIELD_PATTERN).expect("Invalid generated field regex"),
            ),
            field_filter: None,
            home_package: None,
            separator: " ".to_string(),
            strict_go: false,
            dump_func: None,
            disable_pointer_replacement: false,
            format_time: false,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("compact", &self.compact)
            .field("strip_package_names", &self.strip_package_names)
            .field("hide_private_fields", &self.hide_private_fields)
            .field("hide_zero_values", &self.hide_zero_values)
            .field("field_exclusions", &self.field_exclusions.as_ref().map(Regex::as_str))
            .field("field_filter", &self.field_filter.as_ref().map(|_| "<fn>"))
            .field("home_package", &self.home_package)
            .field("separator", &self.separator)
            .field("strict_go", &self.strict_go)
            .field("dump_func", &self.dump_func.as_ref().map(|_| "<fn>"))
            .field("disable_pointer_replacement", &self.disable_pointer_replacement)
            .field("format_time", &self.format_time)
            .finish()
    }
}

impl Options {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with every filter off and no separator.
    pub fn bare() -> Self {
        Self {
            hide_private_fields: false,
            field_exclusions: None,
            separator: String::new(),
            ..Default::default()
        }
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn with_strip_package_names(mut self, strip: bool) -> Self {
        self.strip_package_names = strip;
        self
    }

    pub fn with_hide_private_fields(mut self, hide: bool) -> Self {
        self.hide_private_fields = hide;
        self
    }

    pub fn with_hide_zero_values(mut self, hide: bool) -> Self {
        self.hide_zero_values = hide;
        self
    }

    /// Replace the field exclusion pattern; `None` excludes nothing.
    pub fn with_field_exclusions(mut self, pattern: Option<Regex>) -> Self {
        self.field_exclusions = pattern;
        self
    }

    pub fn with_field_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Field) -> bool + Send + Sync + 'static,
    {
        self.field_filter = Some(Arc::new(filter));
        self
    }

    pub fn with_home_package(mut self, package: &str) -> Self {
        self.home_package = Some(package.to_string());
        self
    }

    pub fn with_separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    pub fn with_strict_go(mut self, strict: bool) -> Self {
        self.strict_go = strict;
        self
    }

    pub fn with_dump_func<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value, &mut dyn io::Write) -> bool + Send + Sync + 'static,
    {
        self.dump_func = Some(Arc::new(hook));
        self
    }

    pub fn with_disable_pointer_replacement(mut self, disable: bool) -> Self {
        self.disable_pointer_replacement = disable;
        self
    }

    pub fn with_format_time(mut self, format: bool) -> Self {
        self.format_time = format;
        self
    }

    /// Whether a record field survives every active exclusion rule.
    pub fn shows_field(&self, field: &Field) -> bool {
        if self.hide_private_fields && !field.exported {
            return false;
        }
        if let Some(exclusions) = &self.field_exclusions {
            if exclusions.is_match(&field.name) {
                return false;
            }
        }
        if let Some(filter) = &self.field_filter {
            if !filter(field) {
                return false;
            }
        }
        !(self.hide_zero_values && field.value.is_zero())
    }

    /// Parse options from a TOML document, starting from the defaults.
    pub fn from_toml_str(content: &str) -> DumpResult<Self> {
        let file: OptionsFile = toml::from_str(content)?;
        file.apply(Self::default())
    }

    /// Load options from a TOML file, starting from the defaults.
    pub fn load(path: &Path) -> DumpResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| DumpError::Load {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// The file form of [`Options`].
///
/// Every key is optional; absent keys keep the value they are applied over.
/// Callbacks cannot be expressed in a file.
///
/// ```toml
/// compact = true
/// home_package = "app"
/// field_exclusions = "^internal_"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsFile {
    pub compact: Option<bool>,
    pub strip_package_names: Option<bool>,
    pub hide_private_fields: Option<bool>,
    pub hide_zero_values: Option<bool>,
    /// An empty pattern turns exclusions off.
    pub field_exclusions: Option<String>,
    pub home_package: Option<String>,
    pub separator: Option<String>,
    pub strict_go: Option<bool>,
    pub disable_pointer_replacement: Option<bool>,
    pub format_time: Option<bool>,
}

impl OptionsFile {
    /// Overlay the keys present in this file onto `options`.
    pub fn apply(self, mut options: Options) -> DumpResult<Options> {
        if let Some(compact) = self.compact {
            options.compact = compact;
        }
        if let Some(strip) = self.strip_package_names {
            options.strip_package_names = strip;
        }
        if let Some(hide) = self.hide_private_fields {
            options.hide_private_fields = hide;
        }
        if let Some(hide) = self.hide_zero_values {
            options.hide_zero_values = hide;
        }
        if let Some(pattern) = self.field_exclusions {
            options.field_exclusions = if pattern.is_empty() {
                None
            } else {
                let regex = Regex::new(&pattern)
                    .map_err(|source| DumpError::Pattern { pattern, source })?;
                Some(regex)
            };
        }
        if let Some(home) = self.home_package {
            options.home_package = Some(home).filter(|home| !home.is_empty());
        }
        if let Some(separator) = self.separator {
            options.separator = separator;
        }
        if let Some(strict) = self.strict_go {
            options.strict_go = strict;
        }
        if let Some(disable) = self.disable_pointer_replacement {
            options.disable_pointer_replacement = disable;
        }
        if let Some(format) = self.format_time {
            options.format_time = format;
        }
        Ok(options)
    }
}

static DEFAULT_OPTIONS: Lazy<RwLock<Options>> = Lazy::new(|| RwLock::new(Options::default()));

/// A snapshot of the process-wide default options.
pub fn config() -> Options {
    DEFAULT_OPTIONS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the process-wide default options.
///
/// Renders already in flight keep the snapshot they started with.
pub fn set_config(options: Options) {
    *DEFAULT_OPTIONS.write().unwrap_or_else(PoisonError::into_inner) = options;
}

/// Modify the process-wide default options in place.
pub fn update_config<F: FnOnce(&mut Options)>(update: F) {
    let mut options = DEFAULT_OPTIONS.write().unwrap_or_else(PoisonError::into_inner);
    update(&mut options);
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(!options.compact);
        assert!(options.hide_private_fields);
        assert_eq!(options.separator, " ");
        assert!(options.field_exclusions.as_ref().unwrap().is_match("XXX_unrecognized"));
        assert!(!options.field_exclusions.as_ref().unwrap().is_match("Name"));
    }

    #[test]
    fn test_bare() {
        let options = Options::bare();
        assert!(!options.hide_private_fields);
        assert!(options.field_exclusions.is_none());
        assert!(options.separator.is_empty());
    }

    #[test]
    fn test_shows_field_rules() {
        let public = Field::public("Name", Value::str("x"));
        let private = Field::private("secret", Value::str("x"));
        let generated = Field::public("XXX_sizecache", Value::Int(3));
        let zero = Field::public("Count", Value::Int(0));

        let options = Options::default();
        assert!(options.shows_field(&public));
        assert!(!options.shows_field(&private));
        assert!(!options.shows_field(&generated));
        assert!(options.shows_field(&zero));

        let options = Options::bare();
        assert!(options.shows_field(&private));
        assert!(options.shows_field(&generated));

        let options = Options::bare().with_hide_zero_values(true);
        assert!(!options.shows_field(&zero));

        let options = Options::bare().with_field_filter(|f| matches!(f.value, Value::Str(_)));
        assert!(options.shows_field(&public));
        assert!(!options.shows_field(&zero));
    }

    #[test]
    fn test_from_toml_str() {
        let options = Options::from_toml_str(
            r#"
            compact = true
            home_package = "app"
            separator = "\n"
            field_exclusions = "^internal_"
            "#,
        )
        .unwrap();

        assert!(options.compact);
        assert_eq!(options.home_package.as_deref(), Some("app"));
        assert_eq!(options.separator, "\n");
        assert!(options.field_exclusions.as_ref().unwrap().is_match("internal_id"));
        assert!(options.hide_private_fields, "absent keys keep their defaults");
    }

    #[test]
    fn test_from_toml_empty_exclusions() {
        let options = Options::from_toml_str(r#"field_exclusions = """#).unwrap();
        assert!(options.field_exclusions.is_none());
    }

    #[test]
    fn test_from_toml_bad_pattern() {
        let err = Options::from_toml_str(r#"field_exclusions = "(""#).unwrap_err();
        assert!(matches!(err, DumpError::Pattern { .. }), "{}", err);
    }

    #[test]
    fn test_from_toml_unknown_key() {
        let err = Options::from_toml_str("colour = true").unwrap_err();
        assert!(matches!(err, DumpError::Parse(_)), "{}", err);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "strip_package_names = true").unwrap();
        writeln!(file, "format_time = true").unwrap();

        let options = Options::load(file.path()).unwrap();
        assert!(options.strip_package_names);
        assert!(options.format_time);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Options::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, DumpError::Load { .. }), "{}", err);
    }

    #[test]
    fn test_debug_hides_callbacks() {
        let options = Options::default().with_field_filter(|_| true);
        let debug = format!("{:?}", options);
        assert!(debug.contains("field_filter: Some(\"<fn>\")"), "{}", debug);
    }
}
