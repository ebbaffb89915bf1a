/// Numerals and their spelled-out forms, longest numeral first so that
/// "24" is replaced before "2" or "4" can split it.
static NUMBER_WORDS: &[(&str, &str)] = &[
    ("10", "ten"),
    ("11", "eleven"),
    ("12", "twelve"),
    ("13", "thirteen"),
    ("14", "fourteen"),
    ("15", "fifteen"),
    ("16", "sixteen"),
    ("17", "seventeen"),
    ("18", "eighteen"),
    ("19", "nineteen"),
    ("20", "twenty"),
    ("24", "twentyfour"),
    ("30", "thirty"),
    ("48", "fortyeight"),
    ("72", "seventytwo"),
    ("0", "zero"),
    ("1", "one"),
    ("2", "two"),
    ("3", "three"),
    ("4", "four"),
    ("5", "five"),
    ("6", "six"),
    ("7", "seven"),
    ("8", "eight"),
    ("9", "nine"),
];

pub const EXACT_SCORE: u32 = 1000;
const SUBSTRING_BASE: u32 = 500;
const SUFFIX_BONUS: u32 = 100;
const CHAR_SCORE: u32 = 10;
const FIRST_CHAR_BONUS: u32 = 5;

/// Replaces arabic numerals with English words ("5h" -> "fiveh").
pub fn expand_numbers(s: &str) -> String {
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return s.to_string();
    }

    let mut result = s.to_string();
    for (numeral, word) in NUMBER_WORDS {
        result = result.replace(numeral, word);
    }
    result
}

/// Scores how well `query` matches `target`. Both are expected lower-cased.
///
/// Higher is better and 0 means no match: an exact match scores 1000, a
/// substring match 500 plus the query length (plus 100 when it is a
/// suffix), and an in-order character match 10 per character.
///
/// Numerals are spelled out on both sides. Field names are already words,
/// so for them this only matters when an array index sits in the path.
pub fn score(query: &str, target: &str) -> u32 {
    if query.is_empty() {
        return 0;
    }

    let query = expand_numbers(query).replace('_', "");
    let target = expand_numbers(target).replace('_', "");

    if query == target {
        return EXACT_SCORE;
    }

    if target.contains(&query) {
        let mut score = SUBSTRING_BASE + query.len() as u32;
        if target.ends_with(&query) {
            score += SUFFIX_BONUS;
        }
        return score;
    }

    let target: Vec<char> = target.chars().collect();
    let mut cursor = 0;
    let mut score = 0;

    for q in query.chars() {
        match target[cursor..].iter().position(|&t| t == q) {
            Some(offset) => {
                let at = cursor + offset;
                score += CHAR_SCORE;
                if at == 0 {
                    score += FIRST_CHAR_BONUS;
                }
                cursor = at + 1;
            }
            None => return 0,
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_numbers() {
        assert_eq!(expand_numbers("5"), "five");
        assert_eq!(expand_numbers("24"), "twentyfour");
        assert_eq!(expand_numbers("5h"), "fiveh");
        assert_eq!(expand_numbers("24hour"), "twentyfourhour");
        assert_eq!(expand_numbers("72"), "seventytwo");
        assert_eq!(expand_numbers(""), "");
        assert_eq!(expand_numbers("no numbers"), "no numbers");
    }

    #[test]
    fn test_expand_numbers_outside_table() {
        // Two-digit entries are tried first, then single digits
        assert_eq!(expand_numbers("100"), "tenzero");
        assert_eq!(expand_numbers("25"), "twofive");
        assert_eq!(expand_numbers("99"), "ninenine");
        assert_eq!(expand_numbers("168h"), "sixteeneighth");
    }

    #[test]
    fn test_expand_numbers_without_digits_is_identity() {
        for s in ["weekly", "five_hour", "SEVEN day", "über-limit", "_"] {
            assert_eq!(expand_numbers(s), s);
        }
    }

    #[test]
    fn test_table_is_longest_numeral_first() {
        let lengths: Vec<usize> = NUMBER_WORDS.iter().map(|(n, _)| n.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(score("five_hour", "five_hour"), 1000);
        assert_eq!(score("fivehour", "five_hour"), 1000);
        assert_eq!(score("5hour", "five_hour"), 1000);
    }

    #[test]
    fn test_substring_match() {
        // "hour" inside "fivehourutilization"
        assert_eq!(score("hour", "five_hour_utilization"), 504);
        // "5h" -> "fiveh", a prefix of "fivehour"
        assert_eq!(score("5h", "five_hour"), 505);
        assert_eq!(score("5", "five_hour"), 504);
    }

    #[test]
    fn test_suffix_bonus() {
        let suffix = score("utilization", "five_hour_utilization");
        assert_eq!(suffix, 500 + 11 + 100);
        assert!(suffix > score("hour", "five_hour_utilization"));
    }

    #[test]
    fn test_array_index_paths() {
        assert_eq!(score("limits_2_name", "limits_2_name"), 1000);
        assert_eq!(score("limits2", "limits_2_name"), 500 + 9);
        assert_eq!(score("limits2", "limits_1_name"), 0);
        assert_eq!(score("array_1_item", "array_1_item"), 1000);
        // Digits in the path are spelled out too
        assert_eq!(score("five", "limit_5"), 504 + 100);
    }

    #[test]
    fn test_subsequence_match() {
        // f(0) +15, h +10, u +10
        assert_eq!(score("fhu", "five_hour_utilization"), 35);
        // w not at position 0
        assert_eq!(score("wl", "seven_day_weekly_limit"), 20);
    }

    #[test]
    fn test_subsequence_requires_order() {
        assert_eq!(score("uf", "five_hour"), 0);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(score("xyz", "five_hour"), 0);
        assert_eq!(score("nonexistent", "weekly_limit"), 0);
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(score("", "five_hour"), 0);
        assert_eq!(score("", ""), 0);
    }
}
