use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;
use url::Url;

/// Slugify a string for use as an anchor ID.
///
/// GitHub style: lowercases, drops every character that is not a letter,
/// mark, number, connector punctuation, `-` or a space, then turns each space
/// into a dash. Consecutive spaces give consecutive dashes, matching how
/// GitHub renders heading anchors.
#[must_use]
pub fn slugify(text: &str) -> String {
  static DISALLOWED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{L}\p{M}\p{N}\p{Pc} -]").unwrap_or_else(|e| {
      log::error!("Failed to compile DISALLOWED_RE regex: {e}");
      never_matching_regex()
    })
  });

  DISALLOWED_RE
    .replace_all(&text.to_lowercase(), "")
    .replace(' ', "-")
}

/// Base used when a heading has no sluggable text.
pub const EMPTY_SLUG: &str = "heading";

/// Generates document-unique slugs.
///
/// The first occurrence of a slug is returned bare, repeats get `-1`, `-2`
/// and so on. A candidate that is already taken, either by an earlier
/// heading or by an ID registered with [`Slugger::reserve`], is skipped.
#[derive(Debug, Default)]
pub struct Slugger {
  occurrences: HashMap<String, usize>,
}

impl Slugger {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Mark an existing ID as taken.
  pub fn reserve(&mut self, id: &str) {
    self.occurrences.entry(id.to_string()).or_insert(0);
  }

  /// Slug `text`, unique among every slug handed out so far.
  pub fn slug(&mut self, text: &str) -> String {
    let mut original = slugify(text);
    if original.is_empty() {
      original = EMPTY_SLUG.to_string();
    }

    let mut result = original.clone();
    while self.occurrences.contains_key(&result) {
      let count = self.occurrences.entry(original.clone()).or_insert(0);
      *count += 1;
      result = format!("{original}-{count}");
    }

    self.occurrences.insert(result.clone(), 0);
    result
  }
}

/// Return true if `href` points outside the site.
///
/// Absolute `http`/`https` URLs and protocol-relative `//host` URLs are
/// external unless their host equals `site_host`. Relative paths, fragments
/// and other schemes (`mailto:`, `tel:`) are internal.
#[must_use]
pub fn is_external_url(href: &str, site_host: Option<&str>) -> bool {
  let href = href.trim();

  let parsed = if href.starts_with("//") {
    Url::parse(&format!("https:{href}"))
  } else {
    Url::parse(href)
  };

  let Ok(url) = parsed else {
    return false;
  };

  if !matches!(url.scheme(), "http" | "https") {
    return false;
  }

  url.host_str().is_some_and(|host| {
    site_host.is_none_or(|site| !host.eq_ignore_ascii_case(site))
  })
}

/// Extract the host of a site URL such as `https://example.org/`.
#[must_use]
pub fn site_host(site_url: &str) -> Option<String> {
  Url::parse(site_url)
    .ok()
    .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
}

/// Create a regex that never matches anything.
///
/// Fallback for lazily compiled patterns that fail to compile.
///
/// # Panics
///
/// Panics if the fallback pattern `r"^\b$"` fails to compile, which should
/// never happen.
#[must_use]
#[allow(clippy::unwrap_used, reason = "fallback pattern is a known-good literal")]
pub fn never_matching_regex() -> regex::Regex {
  regex::Regex::new(r"[^\s\S]")
    .unwrap_or_else(|_| regex::Regex::new(r"^\b$").unwrap())
}
