//! Asset identifier pattern.
//!
//! Asset names follow `{type}[-{subtype}]-{code}` where the code is the
//! fixed site prefix followed by a run of characters containing neither
//! whitespace nor `-`. The pattern applies to file names and directory
//! names alike; anything that does not match is not inventory.

use std::sync::LazyLock;

use regex::Regex;

use crate::consts::SITE_PREFIX;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(&format!(r"^(.+)-({SITE_PREFIX}[^\s-]+)$")).expect("identifier pattern is valid")
});

/// A name split into its type portion and site-prefixed code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedName<'a> {
  /// Everything before the final `-{code}` segment, subtypes included.
  pub asset_type: &'a str,
  /// The site-prefixed code, unique per asset.
  pub code: &'a str,
}

/// Parse a file or directory name into type and code.
///
/// Returns `None` when the name does not follow the identifier pattern.
pub fn parse_name(name: &str) -> Option<ParsedName<'_>> {
  let caps = NAME_PATTERN.captures(name)?;
  Some(ParsedName {
    asset_type: caps.get(1)?.as_str(),
    code: caps.get(2)?.as_str(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn simple_name() {
    let parsed = parse_name("widget-sr100").unwrap();
    assert_eq!(parsed.asset_type, "widget");
    assert_eq!(parsed.code, "sr100");
  }

  #[test]
  fn subtyped_name_splits_on_last_code_segment() {
    let parsed = parse_name("motor-board-sr0412").unwrap();
    assert_eq!(parsed.asset_type, "motor-board");
    assert_eq!(parsed.code, "sr0412");
  }

  #[test]
  fn code_runs_to_end_of_name() {
    // A trailing segment after the code means the code portion contains
    // a `-`, which the pattern forbids.
    assert!(parse_name("widget-sr100-spare").is_none());
  }

  #[test]
  fn prefix_must_follow_a_dash() {
    assert!(parse_name("sr100").is_none());
    assert!(parse_name("widgetsr100").is_none());
  }

  #[test]
  fn non_inventory_names_rejected() {
    assert!(parse_name("README.md").is_none());
    assert!(parse_name("info").is_none());
    assert!(parse_name("").is_none());
  }

  #[test]
  fn whitespace_in_code_rejected() {
    assert!(parse_name("widget-sr1 00").is_none());
  }
}
