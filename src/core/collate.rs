//! Case and accent folding shared by sorting, facets and bulk deletes

use unicase::UniCase;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Key under which text sorts: accents stripped, then Unicode case-folded
///
/// "Élodie" and "elodie" produce equal keys and both sort between "Ana" and
/// "Zed".
pub fn collation_key(text: &str) -> UniCase<String> {
    UniCase::new(text.nfd().filter(|c| !is_combining_mark(*c)).collect())
}

/// Case-insensitive equality used wherever a user-picked value is matched
pub fn same_text(a: &str, b: &str) -> bool {
    UniCase::new(a) == UniCase::new(b)
}

/// Key for deduplicating values that differ only in case
pub fn case_key(text: &str) -> UniCase<String> {
    UniCase::new(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collation_key_ignores_accents_and_case() {
        assert_eq!(collation_key("Élodie"), collation_key("elodie"));
        assert!(collation_key("Ana") < collation_key("Élodie"));
        assert!(collation_key("Élodie") < collation_key("Zed"));
    }

    #[test]
    fn test_same_text_folds_beyond_ascii() {
        assert!(same_text("UPLB", "uplb"));
        assert!(same_text("ÉCOLE", "école"));
        assert!(!same_text("école", "ecole"));
    }
}
