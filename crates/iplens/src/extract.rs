//! Extraction of IPv4 addresses from free text.
//!
//! Candidates are dotted quads of one to three digits each. Matches are not
//! anchored to word boundaries, so `1234.5.6.7` yields `234.5.6.7`.
//! Candidates with an octet above 255 are discarded.

use crate::error::Result;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}")
        .expect("address pattern is a valid regex")
});

/// Returns every valid IPv4 address in `text`, in order of appearance.
///
/// Duplicates are kept.
#[must_use]
pub fn extract_keys(text: &str) -> Vec<String> {
    let mut candidates = 0usize;
    let keys: Vec<String> = CANDIDATE
        .find_iter(text)
        .inspect(|_| candidates += 1)
        .map(|m| m.as_str())
        .filter(|candidate| is_valid_ipv4(candidate))
        .map(str::to_string)
        .collect();

    debug!(
        candidates,
        valid = keys.len(),
        "Extracted addresses from text"
    );
    keys
}

/// Reads `path` and extracts addresses from its contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub async fn extract_keys_from_file(path: &Path) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(extract_keys(&text))
}

/// Returns `true` if `candidate` is four dot-separated decimal octets, each
/// of one to three digits and at most 255.
#[must_use]
pub fn is_valid_ipv4(candidate: &str) -> bool {
    let octets: Vec<&str> = candidate.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|octet| {
            (1..=3).contains(&octet.len())
                && octet.bytes().all(|b| b.is_ascii_digit())
                && octet.parse::<u16>().is_ok_and(|n| n <= 255)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0.0.0.0", true)]
    #[case("255.255.255.255", true)]
    #[case("010.1.1.1", true)]
    #[case("256.1.1.1", false)]
    #[case("999.999.999.999", false)]
    #[case("1.2.3", false)]
    #[case("1.2.3.4.5", false)]
    #[case("1..3.4", false)]
    #[case("a.b.c.d", false)]
    fn test_is_valid_ipv4(#[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(is_valid_ipv4(candidate), expected);
    }

    #[test]
    fn test_extract_keys_in_order_with_duplicates() {
        let text = "seen 8.8.8.8 then 45.5.24.47, again 8.8.8.8";
        assert_eq!(
            extract_keys(text),
            ["8.8.8.8", "45.5.24.47", "8.8.8.8"]
        );
    }

    #[test]
    fn test_extract_keys_discards_out_of_range() {
        assert_eq!(
            extract_keys("999.999.999.999 and 189.36.244.240"),
            ["189.36.244.240"]
        );
    }

    #[test]
    fn test_extract_keys_unanchored() {
        assert_eq!(extract_keys("id=1234.5.6.7"), ["234.5.6.7"]);
    }

    #[test]
    fn test_extract_keys_none() {
        assert!(extract_keys("no addresses here, only 1.2.3").is_empty());
    }

    #[tokio::test]
    async fn test_extract_keys_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("list_of_ips.txt");
        std::fs::write(&path, "10.0.0.1\n10.0.0.2\nbogus 300.1.1.1\n").unwrap();

        let keys = extract_keys_from_file(&path).await.unwrap();
        assert_eq!(keys, ["10.0.0.1", "10.0.0.2"]);
    }

    #[tokio::test]
    async fn test_extract_keys_from_missing_file() {
        let result = extract_keys_from_file(Path::new("/definitely/not/here.txt")).await;
        assert!(result.is_err());
    }
}
