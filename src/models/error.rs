use std::error::Error;

/// An application error that knows its monitoring classification.
///
/// Implementors expose the stable, low-cardinality codes that metrics and
/// alerting key on (e.g. `"E_TIMEOUT"`), independent of the human-readable
/// message. A single failure may carry several codes, most specific first.
pub trait ClassifiedError: Error {
    /// Classification codes for this failure, most specific first.
    fn error_codes(&self) -> Vec<&str>;

    /// The code used where a metric label has room for only one.
    fn primary_code(&self) -> &str {
        self.error_codes().first().copied().unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::ClassifiedError;
    use std::fmt;

    #[derive(Debug)]
    struct Classified(Vec<&'static str>);

    impl fmt::Display for Classified {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "classified error")
        }
    }

    impl std::error::Error for Classified {}

    impl ClassifiedError for Classified {
        fn error_codes(&self) -> Vec<&str> {
            self.0.clone()
        }
    }

    #[test]
    fn primary_code_is_the_first_code() {
        let err = Classified(vec!["E_TIMEOUT", "E_DOWNSTREAM"]);
        assert_eq!(err.primary_code(), "E_TIMEOUT");
    }

    #[test]
    fn primary_code_falls_back_when_no_codes_given() {
        let err = Classified(vec![]);
        assert_eq!(err.primary_code(), "unknown");
    }
}
