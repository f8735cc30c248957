//! Path pattern matching.
//!
//! # Responsibilities
//! - Match a request path against a route's pattern
//! - Support plain prefixes and trailing `/**` globs
//! - Detect overlapping patterns for load-time validation
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/customer/**` matches `/customer` itself and anything below it
//! - A pattern without a glob is a prefix match, O(n), no regex

/// Compiled path pattern for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Plain prefix: matches any path starting with it.
    Prefix(String),
    /// `<base>/**`: matches `<base>` exactly or any path under `<base>/`.
    Glob { base: String },
}

impl PathPattern {
    /// Parse a pattern string. Must be non-empty and start with `/`.
    pub fn parse(pattern: &str) -> Result<Self, String> {
        if pattern.is_empty() {
            return Err("pattern must not be empty".to_string());
        }
        if !pattern.starts_with('/') {
            return Err(format!("pattern {:?} must start with '/'", pattern));
        }
        if let Some(base) = pattern.strip_suffix("/**") {
            let base = if base.is_empty() { "/" } else { base };
            if base.contains('*') {
                return Err(format!("pattern {:?}: '*' only allowed as trailing /**", pattern));
            }
            return Ok(PathPattern::Glob {
                base: base.to_string(),
            });
        }
        if pattern.contains('*') {
            return Err(format!("pattern {:?}: '*' only allowed as trailing /**", pattern));
        }
        Ok(PathPattern::Prefix(pattern.to_string()))
    }

    /// Does `path` fall under this pattern?
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
            PathPattern::Glob { base } => {
                if base == "/" {
                    return path.starts_with('/');
                }
                path == base || path.starts_with(&format!("{}/", base))
            }
        }
    }

    /// The literal leading part of the pattern, used for overlap detection.
    pub fn base(&self) -> &str {
        match self {
            PathPattern::Prefix(prefix) => prefix,
            PathPattern::Glob { base } => base,
        }
    }

    /// Two patterns overlap when some path could match both, which for
    /// prefix-shaped patterns means one base is a prefix of the other.
    pub fn overlaps(&self, other: &PathPattern) -> bool {
        self.base().starts_with(other.base()) || other.base().starts_with(self.base())
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathPattern::Prefix(prefix) => write!(f, "{}", prefix),
            PathPattern::Glob { base } => {
                if base == "/" {
                    write!(f, "/**")
                } else {
                    write!(f, "{}/**", base)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matching() {
        let p = PathPattern::parse("/api").unwrap();
        assert!(p.matches("/api"));
        assert!(p.matches("/api/v1"));
        assert!(p.matches("/apiary")); // plain prefix semantics
        assert!(!p.matches("/images"));
    }

    #[test]
    fn test_glob_matching() {
        let p = PathPattern::parse("/customer/**").unwrap();
        assert!(p.matches("/customer"));
        assert!(p.matches("/customer/123"));
        assert!(p.matches("/customer/a/b"));
        assert!(!p.matches("/customers"));
        assert!(!p.matches("/order/1"));
    }

    #[test]
    fn test_root_glob_matches_everything() {
        let p = PathPattern::parse("/**").unwrap();
        assert!(p.matches("/"));
        assert!(p.matches("/anything/at/all"));
    }

    #[test]
    fn test_invalid_patterns_rejected() {
        assert!(PathPattern::parse("").is_err());
        assert!(PathPattern::parse("customer/**").is_err());
        assert!(PathPattern::parse("/a/*/b").is_err());
        assert!(PathPattern::parse("/a/**/b").is_err());
    }

    #[test]
    fn test_overlap_detection() {
        let broad = PathPattern::parse("/api/**").unwrap();
        let narrow = PathPattern::parse("/api/v1/**").unwrap();
        let other = PathPattern::parse("/images/**").unwrap();
        assert!(broad.overlaps(&narrow));
        assert!(narrow.overlaps(&broad));
        assert!(!broad.overlaps(&other));
    }

    #[test]
    fn test_display_roundtrip() {
        for raw in ["/customer/**", "/api", "/**"] {
            assert_eq!(PathPattern::parse(raw).unwrap().to_string(), raw);
        }
    }
}
