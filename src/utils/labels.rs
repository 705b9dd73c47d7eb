//! Display truncation for addresses and signatures

/// First 4 and last 4 characters joined by an ellipsis.
/// Ids of 8 characters or fewer are returned unchanged.
pub fn short_id(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= 8 {
        return id.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Signature prefix used in evidence reasons
pub fn short_signature(signature: &str) -> String {
    let head: String = signature.chars().take(8).collect();
    if head.len() < signature.len() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(
            short_id("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM"),
            "9WzD...AWWM"
        );
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id("abcdefgh"), "abcdefgh");
        assert_eq!(short_id("abcdefghi"), "abcd...fghi");
    }

    #[test]
    fn test_short_signature() {
        assert_eq!(short_signature("5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnb"), "5VERv8NM...");
        assert_eq!(short_signature("tx1"), "tx1");
    }
}
