//! Opt-in skipping for suites that need embedded PostgreSQL.
//!
//! A failed cluster start is a test failure unless the host has declared it
//! cannot run PostgreSQL by setting `IDM_SKIP_EMBEDDED_PG`.

use std::env;
use std::fmt::Display;

pub const SKIP_ENV: &str = "IDM_SKIP_EMBEDDED_PG";

/// Prefix of every line a skipped suite prints to stderr.
pub const SKIP_MARKER: &str = "SKIP-EMBEDDED-PG";

fn flag_enabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Turn a cluster setup failure into a skip, or panic when skipping is not
/// enabled.
pub fn handle_cluster_setup_failure<T>(reason: impl Display) -> Option<T> {
    let skip = env::var(SKIP_ENV).is_ok_and(|value| flag_enabled(&value));
    assert!(
        skip,
        "embedded PostgreSQL unavailable: {reason} (set {SKIP_ENV}=1 to skip)"
    );
    eprintln!("{SKIP_MARKER}: {reason}");
    None
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::flag_enabled;

    #[rstest]
    #[case("1", true)]
    #[case("TRUE", true)]
    #[case(" yes\n", true)]
    #[case("on", true)]
    #[case("0", false)]
    #[case("off", false)]
    #[case("", false)]
    fn skip_flag_values(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(flag_enabled(value), expected);
    }
}
