//! Fixed character tables and name sets.
//!
//! Replacement tables are ordered: entries are applied one after another as
//! literal substring replacements, so text produced by an early entry can be
//! rewritten by a later one.

use phf::{phf_ordered_map, phf_set, OrderedMap, Set};

/// Misrecognition fixes for typed or recognized questions.
pub static REPAIR_TABLE: OrderedMap<&'static str, &'static str> = phf_ordered_map! {
    "l" => "1",
    "I" => "1",
    "O" => "0",
    "o" => "0",
    "×" => "*",
    "÷" => "/",
    "−" => "-",
    "²" => "^2",
    "³" => "^3",
    "√" => "sqrt",
    "π" => "pi",
    "∞" => "oo",
};

/// Glyph confusions typical of raw handwriting-model output (already lower-cased).
pub static RECOGNIZER_TABLE: OrderedMap<&'static str, &'static str> = phf_ordered_map! {
    "t" => "+",
    "l" => "1",
    "o" => "0",
    "s" => "5",
};

/// Applied to the selected candidate before the operator check.
pub static POST_PROCESS_TABLE: OrderedMap<&'static str, &'static str> = phf_ordered_map! {
    "l" => "1",
    "I" => "1",
    "O" => "0",
    "o" => "0",
    "S" => "5",
    "s" => "5",
    "G" => "6",
    "g" => "9",
    "B" => "8",
    "Z" => "2",
    "z" => "2",
    "×" => "*",
    "÷" => "/",
    "−" => "-",
    "[" => "(",
    "]" => ")",
    "{" => "(",
    "}" => ")",
};

/// Applied to text from the lower-confidence fallback recognizer.
pub static FALLBACK_TABLE: OrderedMap<&'static str, &'static str> = phf_ordered_map! {
    "l" => "1",
    "O" => "0",
    "o" => "0",
};

/// Identifiers that never name a free variable.
pub static EXCLUDED_IDENTIFIERS: Set<&'static str> = phf_set! {
    "sin", "cos", "tan", "asin", "acos", "atan",
    "sqrt", "log", "ln", "exp", "abs",
    "pi", "e", "oo", "inf", "nan",
};

/// Whole words the repair table leaves alone, so `cos` does not become `c0s`.
pub static PROTECTED_WORDS: Set<&'static str> = phf_set! {
    "sin", "cos", "tan", "asin", "acos", "atan",
    "sqrt", "log", "ln", "exp", "abs",
    "pi", "oo",
};

/// Characters kept by the post-processor.
pub const POST_PROCESS_ALPHABET: &str = "0123456789+-*/=().xX ";

/// Operators whose presence marks text as math.
pub const OPERATOR_CHARS: &str = "+-*/^=";

/// Characters that raise a candidate's score.
pub const SCORE_CHARS: &str = "+-*/=()";

/// True for characters of the canonical expression alphabet.
pub fn is_canonical(c: char) -> bool {
    c.is_ascii_alphanumeric() || "+-*/^=(). ".contains(c)
}

/// Apply an ordered replacement table to `text`.
pub fn apply_table(table: &OrderedMap<&'static str, &'static str>, text: &str) -> String {
    table
        .entries()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_apply_in_declaration_order() {
        let keys: Vec<_> = RECOGNIZER_TABLE.keys().copied().collect();
        assert_eq!(keys, vec!["t", "l", "o", "s"]);
    }

    #[test]
    fn later_entries_see_earlier_output() {
        // "∞" becomes "oo" after the "o" entry already ran, so it survives
        assert_eq!(apply_table(&REPAIR_TABLE, "x=∞"), "x=oo");
        assert_eq!(apply_table(&REPAIR_TABLE, "lO²"), "10^2");
    }

    #[test]
    fn canonical_alphabet() {
        assert!("2x+(y-1.5)^2=0 ".chars().all(is_canonical));
        assert!(!is_canonical('√'));
        assert!(!is_canonical('_'));
        assert!(!is_canonical('?'));
    }

    #[test]
    fn excluded_identifiers_cover_functions_and_constants() {
        assert!(EXCLUDED_IDENTIFIERS.contains("sqrt"));
        assert!(EXCLUDED_IDENTIFIERS.contains("e"));
        assert!(!EXCLUDED_IDENTIFIERS.contains("x"));
    }
}
