//! Endpoint resolution: game-format strings to cache/remote lookup keys
//!
//! Format strings arriving from the simulator carry noise that the data
//! sources do not key on: rating modifiers (`unrated`, `blitz`) and
//! rotating series/regulation suffixes. The resolution pipeline strips
//! those, rewrites format families that share a dataset, and decides
//! whether the query is format-scoped or collapses to the bare-generation
//! endpoint.

use crate::error::{Error, Result};
use battledex_core::{to_key, Generation};

/// Ignorable keywords stripped in this order before anything else.
const IGNORED_KEYWORDS: &[&str] = &["unrated", "blitz"];

/// Trailing tags stripped together with their argument (`series1`,
/// `regulationg`).
const IGNORED_TAGS: &[&str] = &["series", "regulation"];

/// Format families rewritten onto the dataset they actually share.
const FAMILY_REWRITES: &[(&str, &str)] = &[
    // Free-for-all and multi-player randoms both draw from the
    // doubles-random pool.
    ("freeforallrandombattle", "randomdoublesbattle"),
    ("multirandombattle", "randomdoublesbattle"),
];

/// Formats containing these keywords are never collapsed to the
/// bare-generation endpoint (randoms, the legacy-hardware tier, the
/// let's-go tier).
const FORMAT_SCOPED_KEYWORDS: &[&str] = &["random", "bdsp", "letsgo"];

/// A resolved lookup key plus the processed format that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    /// The cache/remote key, e.g. `gen9randombattle` or `gen9`
    pub key: String,
    /// The processed generation-stripped format, when format-scoped
    pub format: Option<String>,
}

/// Resolve an endpoint key for a generation and optional format.
///
/// `format_only` forces format-scoped resolution (used by usage queries,
/// which are always format-scoped); it errors when no usable format
/// remains after processing.
pub fn resolve_endpoint(
    gen: Generation,
    format: Option<&str>,
    format_only: bool,
) -> Result<ResolvedEndpoint> {
    let processed = format.map(|f| process_format(gen, f)).unwrap_or_default();

    let scoped = !processed.is_empty()
        && (format_only
            || FORMAT_SCOPED_KEYWORDS
                .iter()
                .any(|kw| processed.contains(kw)));

    if scoped {
        return Ok(ResolvedEndpoint {
            key: format!("gen{}{}", gen.raw(), processed),
            format: Some(processed),
        });
    }
    if format_only {
        return Err(Error::FormatRequired);
    }
    Ok(ResolvedEndpoint {
        key: gen.endpoint(),
        format: None,
    })
}

/// Canonicalize a format string and strip the ignorable noise
fn process_format(gen: Generation, format: &str) -> String {
    let mut f = to_key(format);

    // Drop a redundant gen prefix ("gen9ou" and "ou" resolve alike).
    if let Ok((prefix_gen, rest)) = Generation::split_format(&f) {
        if prefix_gen == gen {
            f = rest.to_string();
        }
    }

    for kw in IGNORED_KEYWORDS {
        f = f.replace(kw, "");
    }
    // Only a trailing tag with a real argument is stripped: digits
    // ("series1") or a single letter ("regulationg"). A tag keyword buried
    // mid-format is part of the format name.
    for tag in IGNORED_TAGS {
        if let Some(i) = f.rfind(tag) {
            let arg = &f[i + tag.len()..];
            let numbered = !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit());
            let lettered = arg.len() == 1 && arg.chars().all(|c| c.is_ascii_alphabetic());
            if numbered || lettered {
                f.truncate(i);
            }
        }
    }
    for (from, to) in FAMILY_REWRITES {
        if f == *from {
            f = to.to_string();
        }
    }
    f
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gen9() -> Generation {
        Generation::new(9).unwrap()
    }

    #[test]
    fn test_resolve_strips_rating_modifiers() {
        let resolved = resolve_endpoint(gen9(), Some("gen9unratedrandombattle"), false).unwrap();
        assert_eq!(resolved.key, "gen9randombattle");

        let resolved = resolve_endpoint(gen9(), Some("gen9blitzrandombattle"), false).unwrap();
        assert_eq!(resolved.key, "gen9randombattle");
    }

    #[test]
    fn test_resolve_strips_series_and_regulation_tags() {
        let resolved = resolve_endpoint(gen9(), Some("gen9vgc2023series1"), true).unwrap();
        assert_eq!(resolved.key, "gen9vgc2023");
        assert_eq!(resolved.format.as_deref(), Some("vgc2023"));

        let resolved = resolve_endpoint(gen9(), Some("gen9battlestadiumsinglesregulationg"), true).unwrap();
        assert_eq!(resolved.key, "gen9battlestadiumsingles");
    }

    #[test]
    fn test_resolve_keeps_mid_format_tag_keywords() {
        // "series" here is part of the format name, not a trailing tag.
        let resolved = resolve_endpoint(gen9(), Some("gen9worldseriesdoubles"), true).unwrap();
        assert_eq!(resolved.key, "gen9worldseriesdoubles");

        let resolved = resolve_endpoint(gen9(), Some("gen9regulationdraft"), true).unwrap();
        assert_eq!(resolved.key, "gen9regulationdraft");
    }

    #[test]
    fn test_resolve_family_rewrites() {
        let resolved =
            resolve_endpoint(gen9(), Some("gen9freeforallrandombattle"), false).unwrap();
        assert_eq!(resolved.key, "gen9randomdoublesbattle");

        let resolved = resolve_endpoint(gen9(), Some("gen9multirandombattle"), false).unwrap();
        assert_eq!(resolved.key, "gen9randomdoublesbattle");
    }

    #[test]
    fn test_resolve_scoped_keywords_never_collapse() {
        for format in ["gen9randombattle", "gen4bdspou", "gen7letsgoou"] {
            let gen = Generation::split_format(format).unwrap().0;
            let resolved = resolve_endpoint(gen, Some(format), false).unwrap();
            assert_ne!(resolved.key, gen.endpoint(), "{format} must stay scoped");
        }
    }

    #[test]
    fn test_resolve_collapses_plain_formats_to_bare_gen() {
        let resolved = resolve_endpoint(gen9(), Some("gen9ou"), false).unwrap();
        assert_eq!(resolved.key, "gen9");
        assert_eq!(resolved.format, None);
    }

    #[test]
    fn test_resolve_format_only_forces_scoping() {
        let resolved = resolve_endpoint(gen9(), Some("gen9ou"), true).unwrap();
        assert_eq!(resolved.key, "gen9ou");
        assert_eq!(resolved.format.as_deref(), Some("ou"));
    }

    #[test]
    fn test_resolve_no_usable_format() {
        let resolved = resolve_endpoint(gen9(), None, false).unwrap();
        assert_eq!(resolved.key, "gen9");

        assert!(resolve_endpoint(gen9(), None, true).is_err());
        assert!(resolve_endpoint(gen9(), Some("unrated"), true).is_err());
    }
}
