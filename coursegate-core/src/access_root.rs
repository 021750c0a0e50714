//! Access root derivation
//!
//! Turns any path-like string (absolute URL, absolute path, relative path,
//! possibly carrying a query or fragment) into the directory scope unlocked
//! by an access grant. The server computes the authoritative root and the
//! client recomputes it when the server omits one, so both sides call this
//! module and nothing else.

use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::trace;
use url::Url;

/// Origin used to resolve inputs that carry no scheme or host
pub const PLACEHOLDER_ORIGIN: &str = "https://placeholder.local";

static PLACEHOLDER_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse(PLACEHOLDER_ORIGIN).expect("placeholder origin is a valid URL"));

/// Reduce `value` to a bare path starting with `/`.
///
/// Blank input becomes `/`. Input the URL parser rejects is used as a raw
/// path instead; either way the query and fragment are dropped. The result
/// is in the parser's canonical form (percent-encoded, dot segments
/// resolved, a single leading slash), so parsing it again yields itself.
pub fn normalize_path(value: &str) -> String {
    let trimmed = value.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if trimmed.is_empty() {
        return "/".to_string();
    }

    let input = collapse_leading_slashes(trimmed);
    match PLACEHOLDER_BASE.join(&input) {
        Ok(url) => canonical_path(url.path()),
        Err(err) => {
            trace!(input = trimmed, error = %err, "Falling back to raw path");
            canonical_path(strip_query_and_fragment(&input))
        }
    }
}

/// Derive the directory-style access root for `value`.
///
/// The result always starts with `/` and is either `/` or ends with `/`.
/// A final segment containing a `.` is taken to be a file name, so
/// `/v1.2` yields `/` while `/v1.2/` is kept as is.
pub fn derive_access_root(value: &str) -> String {
    let normalized = normalize_path(value);
    if normalized == "/" || normalized.ends_with('/') {
        return normalized;
    }

    let last_slash = normalized.rfind('/').unwrap_or(0);
    let last_segment = &normalized[last_slash + 1..];

    if last_segment.contains('.') {
        if last_slash == 0 {
            return "/".to_string();
        }
        return normalized[..=last_slash].to_string();
    }

    format!("{normalized}/")
}

/// Whether `value` already has the shape of an access root
pub fn is_access_root(value: &str) -> bool {
    value.starts_with('/') && value.ends_with('/')
}

fn strip_query_and_fragment(path: &str) -> &str {
    let path = path.split_once('#').map_or(path, |(head, _)| head);
    path.split_once('?').map_or(path, |(head, _)| head)
}

/// Browsers read `///host/x` as `//host/x`; the `url` crate rejects the
/// empty host instead.
fn collapse_leading_slashes(input: &str) -> Cow<'_, str> {
    let rest = input.trim_start_matches(['/', '\\']);
    if input.len() - rest.len() > 2 {
        Cow::Owned(format!("//{rest}"))
    } else {
        Cow::Borrowed(input)
    }
}

/// Re-encode `path` the way the parser encodes a special-scheme path and
/// squash leading slashes, so the result cannot reparse as `//host`.
/// Opaque paths (`mailto:x`) come in without a leading slash.
fn canonical_path(path: &str) -> String {
    let mut url = PLACEHOLDER_BASE.clone();
    url.set_path(path);
    format!("/{}", url.path().trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "/",
        "/index.html",
        "/course/week1/index.html",
        "/course/week1/",
        "/course/week1",
        "course/week1/page.html",
        "index.html",
        "https://example.com/a/b.txt?x=1#y",
        "https://example.com",
        "http://[invalid/a/b.html",
        "/v1.2",
        "/v1.2/",
        "/a/b?next=/c.html",
        "/a/b#frag.html",
        "?only=query",
        "#only-fragment",
        "mailto:someone",
        "mailto:some.one",
        "../../escape/attempt",
        "/a/./b/../c.d",
        "//other-host/path/file.js",
        "http://[ a/b.html",
        "http://[x\"y/z.html",
        "http://[<a>/b",
        "///a.b/c/d.html",
        "\u{feff}/a/b.c",
        "https://example.com//other/page.html",
        "mailto:a b",
        "http://[bad/a\\b/c",
        "/tab\tinside/x",
    ];

    #[test]
    fn test_documented_examples() {
        assert_eq!(derive_access_root("/index.html"), "/");
        assert_eq!(derive_access_root("/course/week1/index.html"), "/course/week1/");
        assert_eq!(derive_access_root("/course/week1/"), "/course/week1/");
        assert_eq!(derive_access_root("/course/week1"), "/course/week1/");
        assert_eq!(derive_access_root(""), "/");
        assert_eq!(derive_access_root(None::<&str>.unwrap_or_default()), "/");
        assert_eq!(derive_access_root("https://example.com/a/b.txt?x=1#y"), "/a/");
    }

    #[test]
    fn test_relative_paths_are_rooted() {
        assert_eq!(derive_access_root("course/week1/page.html"), "/course/week1/");
        assert_eq!(derive_access_root("index.html"), "/");
        assert_eq!(derive_access_root("course"), "/course/");
    }

    #[test]
    fn test_dotted_directory_heuristic_is_kept() {
        assert_eq!(derive_access_root("/v1.2"), "/");
        assert_eq!(derive_access_root("/docs/v1.2"), "/docs/");
        assert_eq!(derive_access_root("/v1.2/"), "/v1.2/");
    }

    #[test]
    fn test_query_and_fragment_are_ignored() {
        assert_eq!(derive_access_root("/a/b?next=/c.html"), "/a/b/");
        assert_eq!(derive_access_root("/a/b#frag.html"), "/a/b/");
        assert_eq!(derive_access_root("?only=query"), "/");
        assert_eq!(derive_access_root("#only-fragment"), "/");
    }

    #[test]
    fn test_malformed_url_falls_back_to_raw_path() {
        assert_eq!(normalize_path("http://[invalid/a/b.html"), "/http://[invalid/a/b.html");
        assert_eq!(derive_access_root("http://[invalid/a/b.html"), "/http://[invalid/a/");
        assert_eq!(derive_access_root("http://[invalid?x=1"), "/http://[invalid/");
    }

    #[test]
    fn test_whitespace_and_dot_segments() {
        assert_eq!(normalize_path("  /course/week1/  "), "/course/week1/");
        assert_eq!(derive_access_root("/a/./b/../c.d"), "/a/");
        assert_eq!(derive_access_root("../../escape/attempt"), "/escape/attempt/");
    }

    #[test]
    fn test_fallback_path_is_percent_encoded() {
        assert_eq!(derive_access_root("http://[ a/b.html"), "/http://[%20a/");
        assert_eq!(derive_access_root("http://[x\"y/z.html"), "/http://[x%22y/");
        assert_eq!(derive_access_root("http://[<a>/b"), "/http://[%3Ca%3E/b/");
    }

    #[test]
    fn test_extra_leading_slashes_name_a_host() {
        assert_eq!(derive_access_root("///a.b/c/d.html"), "/c/");
        assert_eq!(derive_access_root("\\\\\\a.b/c/d.html"), "/c/");
        assert_eq!(derive_access_root("//a.b/c/d.html"), "/c/");
    }

    #[test]
    fn test_byte_order_mark_is_trimmed() {
        assert_eq!(derive_access_root("\u{feff}/a/b.c"), "/a/");
        assert_eq!(derive_access_root("\u{feff} /a/b/ \u{feff}"), "/a/b/");
    }

    #[test]
    fn test_root_never_starts_with_double_slash() {
        assert_eq!(derive_access_root("https://example.com//other/page.html"), "/other/");
        assert_eq!(normalize_path("https://example.com//"), "/");
    }

    #[test]
    fn test_opaque_paths_still_rooted() {
        assert_eq!(derive_access_root("mailto:someone"), "/someone/");
        assert_eq!(derive_access_root("mailto:some.one"), "/");
        assert_eq!(derive_access_root("mailto:a b"), "/a%20b/");
    }

    #[test]
    fn test_output_contract_holds() {
        for sample in SAMPLES {
            let root = derive_access_root(sample);
            assert!(root.starts_with('/'), "{sample:?} -> {root:?}");
            assert!(root == "/" || root.ends_with('/'), "{sample:?} -> {root:?}");
            assert!(is_access_root(&root), "{sample:?} -> {root:?}");
        }
    }

    #[test]
    fn test_idempotent() {
        for sample in SAMPLES {
            let once = derive_access_root(sample);
            let twice = derive_access_root(&once);
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }

    mod properties {
        use super::super::*;
        use proptest::prelude::*;

        fn check(input: &str) -> Result<(), TestCaseError> {
            let root = derive_access_root(input);
            prop_assert!(root.starts_with('/'), "{:?} -> {:?}", input, root);
            prop_assert!(root == "/" || root.ends_with('/'), "{:?} -> {:?}", input, root);
            prop_assert!(!root.starts_with("//"), "{:?} -> {:?}", input, root);
            prop_assert_eq!(derive_access_root(&root), root.clone(), "input {:?}", input);
            Ok(())
        }

        proptest! {
            #[test]
            fn test_contract_for_any_string(input in any::<String>()) {
                check(&input)?;
            }

            #[test]
            fn test_contract_for_url_like_strings(
                scheme in prop::sample::select(vec!["", "http:", "https:", "mailto:", "foo:", "file:"]),
                slashes in "[/\\\\]{0,4}",
                rest in "[a-z0-9.\\[\\] <>\"%?#:@/\\\\\t\u{feff}é]{0,30}",
            ) {
                check(&format!("{scheme}{slashes}{rest}"))?;
            }
        }
    }
}
