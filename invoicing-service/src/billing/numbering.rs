//! Human-readable document numbers such as `I-2025-0001`.

/// The document families that draw numbers from their own counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Invoice,
    Quote,
}

impl DocumentKind {
    /// Key of the counter record in the sequence store.
    pub fn sequence_key(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Quote => "quote",
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "I",
            DocumentKind::Quote => "Q",
        }
    }

    pub fn format_number(&self, year: i32, sequence: i64) -> String {
        format_document_number(self.prefix(), year, sequence)
    }
}

/// Zero-pads the sequence to four digits; larger values keep all digits.
pub fn format_document_number(prefix: &str, year: i32, sequence: i64) -> String {
    format!("{}-{}-{:04}", prefix, year, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_invoice_of_the_year() {
        assert_eq!(DocumentKind::Invoice.format_number(2025, 1), "I-2025-0001");
    }

    #[test]
    fn sequence_grows_past_four_digits() {
        assert_eq!(format_document_number("I", 2025, 9999), "I-2025-9999");
        assert_eq!(format_document_number("I", 2025, 10001), "I-2025-10001");
    }

    #[test]
    fn quotes_use_their_own_prefix_and_counter() {
        assert_eq!(DocumentKind::Quote.format_number(2024, 42), "Q-2024-0042");
        assert_ne!(
            DocumentKind::Quote.sequence_key(),
            DocumentKind::Invoice.sequence_key()
        );
    }
}
