//! Cell values accepted on the grid channel

/// Content of a fillable cell as carried in a grid update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillValue {
    Blank,
    /// ASCII letter or digit, uppercased
    Letter(char),
}

impl FillValue {
    /// Parse `""`/`" "` or a single ASCII alphanumeric
    ///
    /// Anything else is rejected, so every accepted value round-trips as
    /// exactly one uppercase character.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut chars = raw.trim().chars();
        match (chars.next(), chars.next()) {
            (None, _) => Some(Self::Blank),
            (Some(c), None) if c.is_ascii_alphanumeric() => {
                Some(Self::Letter(c.to_ascii_uppercase()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_letters_and_blanks() {
        assert_eq!(FillValue::parse("a"), Some(FillValue::Letter('A')));
        assert_eq!(FillValue::parse("7"), Some(FillValue::Letter('7')));
        assert_eq!(FillValue::parse(""), Some(FillValue::Blank));
        assert_eq!(FillValue::parse(" "), Some(FillValue::Blank));
    }

    #[test]
    fn test_parse_rejects_non_ascii() {
        // Both would uppercase to something that is not one ASCII letter
        assert_eq!(FillValue::parse("ß"), None);
        assert_eq!(FillValue::parse("é"), None);
        assert_eq!(FillValue::parse("AB"), None);
        assert_eq!(FillValue::parse("."), None);
    }
}
