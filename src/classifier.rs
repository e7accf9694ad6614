use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Classification {
    Blocked,
    Educational,
    Neutral,
}

/// Labels `text` by case-insensitive substring containment. Blocked keywords are
/// checked first, so a text matching both lists is `Blocked`.
///
/// Matching is literal containment with no word boundaries: "gaming" also matches
/// inside "wargaming".
pub fn classify<S: AsRef<str>>(text: &str, allowed: &[S], blocked: &[S]) -> Classification {
    let text = text.to_lowercase();

    if contains_any(&text, blocked) {
        Classification::Blocked
    } else if contains_any(&text, allowed) {
        Classification::Educational
    } else {
        Classification::Neutral
    }
}

/// True when any non-empty keyword occurs in `text` (case-insensitive).
pub fn matches_any<S: AsRef<str>>(text: &str, keywords: &[S]) -> bool {
    contains_any(&text.to_lowercase(), keywords)
}

fn contains_any<S: AsRef<str>>(lowered: &str, keywords: &[S]) -> bool {
    keywords.iter().any(|keyword| {
        let keyword = keyword.as_ref();
        !keyword.is_empty() && lowered.contains(&keyword.to_lowercase())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_takes_precedence() {
        assert_eq!(
            classify("Python Prank Compilation", &["python"], &["prank"]),
            Classification::Blocked
        );
    }

    #[test]
    fn test_allowed_match_is_educational() {
        assert_eq!(
            classify("Intro to Python Tutorial", &["python"], &["prank"]),
            Classification::Educational
        );
    }

    #[test]
    fn test_no_match_is_neutral() {
        assert_eq!(
            classify("Cooking pasta at home", &["python"], &["prank"]),
            Classification::Neutral
        );
    }

    #[test]
    fn test_case_insensitive_both_sides() {
        assert_eq!(
            classify("LEARN RUST FAST", &["Rust"], &[] as &[&str]),
            Classification::Educational
        );
    }

    #[test]
    fn test_substring_without_word_boundary() {
        assert_eq!(
            classify("Wargaming history deep dive", &["history"], &["gaming"]),
            Classification::Blocked
        );
    }

    #[test]
    fn test_empty_keywords_never_match() {
        assert_eq!(classify("anything", &[""], &[""]), Classification::Neutral);
        assert!(!matches_any("anything", &[""]));
    }

    #[test]
    fn test_blocked_property_over_many_texts() {
        let allowed = ["python", "math", "science"];
        let blocked = ["prank", "drama"];
        let texts = [
            "python drama explained",
            "Math PRANK gone wrong",
            "science of drama",
            "prank",
        ];

        for text in texts {
            assert_eq!(classify(text, &allowed, &blocked), Classification::Blocked, "{text}");
        }
    }

    #[test]
    fn test_owned_keyword_lists() {
        let allowed = vec!["react".to_string()];
        let blocked: Vec<String> = Vec::new();
        assert_eq!(
            classify("Learn React in 30 Minutes", &allowed, &blocked),
            Classification::Educational
        );
    }
}
