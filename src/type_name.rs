//! Type-name rewriting applied to every emitted type name.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DumpError, DumpResult};
use crate::options::Options;

/// Any `pkg.` or `module::` qualifier.
static PACKAGE_QUALIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[a-zA-Z_][a-zA-Z_0-9]*(?:\.|::)").expect("Invalid package qualifier regex")
});

/// Whitespace around punctuation, squeezed out in compact mode.
static PUNCTUATION_SPACING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*([,;{}()])\s*").expect("Invalid punctuation regex"));

/// Rewrites type names according to the options of one render session.
#[derive(Debug, Clone)]
pub(crate) struct TypeNamer {
    strip_packages: bool,
    home_package: Option<Regex>,
    compact: bool,
}

impl TypeNamer {
    pub(crate) fn new(options: &Options) -> DumpResult<Self> {
        let home_package = match options.home_package.as_deref() {
            Some(home) if !home.is_empty() => {
                let pattern = format!(r"\b{}(?:\.|::)", regex::escape(home));
                let regex = Regex::new(&pattern)
                    .map_err(|source| DumpError::Pattern { pattern, source })?;
                Some(regex)
            }
            _ => None,
        };

        Ok(Self {
            strip_packages: options.strip_package_names,
            home_package,
            compact: options.compact,
        })
    }

    /// Stripping every qualifier wins over eliding only the home package.
    pub(crate) fn name<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        let name = if self.strip_packages {
            PACKAGE_QUALIFIER.replace_all(raw, "")
        } else if let Some(home) = &self.home_package {
            home.replace_all(raw, "")
        } else {
            Cow::Borrowed(raw)
        };

        if self.compact && PUNCTUATION_SPACING.is_match(&name) {
            return Cow::Owned(PUNCTUATION_SPACING.replace_all(&name, "$1").into_owned());
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namer(options: Options) -> TypeNamer {
        TypeNamer::new(&options).unwrap()
    }

    #[test]
    fn test_names_untouched_by_default() {
        let namer = namer(Options::default());
        assert_eq!(namer.name("[]pkg.Thing"), "[]pkg.Thing");
        assert_eq!(namer.name("interface {}"), "interface {}");
    }

    #[test]
    fn test_strip_package_names() {
        let namer = namer(Options::default().with_strip_package_names(true));
        assert_eq!(namer.name("[]pkg.Thing"), "[]Thing");
        assert_eq!(namer.name("map[string]*other_pkg.Node"), "map[string]*Node");
        assert_eq!(namer.name("my_crate::module::Node"), "Node");
        assert_eq!(namer.name("int"), "int");
    }

    #[test]
    fn test_home_package_only() {
        let namer = namer(Options::default().with_home_package("app"));
        assert_eq!(namer.name("map[app.Key]lib.Value"), "map[Key]lib.Value");
        assert_eq!(namer.name("app::Node"), "Node");
        assert_eq!(namer.name("myapp.Node"), "myapp.Node");
    }

    #[test]
    fn test_strip_wins_over_home_package() {
        let namer = namer(
            Options::default()
                .with_home_package("app")
                .with_strip_package_names(true),
        );
        assert_eq!(namer.name("map[app.Key]lib.Value"), "map[Key]Value");
    }

    #[test]
    fn test_compact_squeezes_punctuation() {
        let namer = namer(Options::default().with_compact(true));
        assert_eq!(namer.name("interface {}"), "interface{}");
        assert_eq!(namer.name("func(string, int) (bool, error)"), "func(string,int)(bool,error)");
    }
}
