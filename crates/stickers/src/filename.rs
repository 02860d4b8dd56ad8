//! Download filename for a generated sheet

/// Longest label fragment kept in the filename
const MAX_LABEL_CHARS: usize = 30;

/// Build `stickers-<label>.pdf`
///
/// Characters outside `[A-Za-z0-9.-]` become `_` and the label part is cut
/// to 30 characters, so the result is always safe inside a quoted
/// Content-Disposition filename.
pub fn sticker_filename(label: &str) -> String {
    let sanitized: String = label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_LABEL_CHARS)
        .collect();

    format!("stickers-{sanitized}.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_url_label() {
        assert_eq!(
            sticker_filename("https://example.com"),
            "stickers-https___example.com.pdf"
        );
    }

    #[test]
    fn test_empty_label() {
        assert_eq!(sticker_filename(""), "stickers-.pdf");
    }

    #[test]
    fn test_truncation() {
        let name = sticker_filename(&"a".repeat(100));
        assert_eq!(name, format!("stickers-{}.pdf", "a".repeat(30)));
    }

    #[test]
    fn test_shape() {
        let pattern = Regex::new(r"^stickers-[A-Za-z0-9._-]{0,30}\.pdf$").unwrap();
        for label in [
            "",
            "héllo wörld",
            "\"quoted\"; filename=evil",
            "https://api.qrserver.com/v1/create-qr-code/?size=500x500&data=x",
            "日本語のラベル",
            "line\nbreak",
        ] {
            let name = sticker_filename(label);
            assert!(pattern.is_match(&name), "{name}");
        }
    }
}
