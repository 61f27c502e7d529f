//! The end-of-questionnaire summary.
//!
//! The "career suggestion" is a word-frequency count over every answer.
//! Stored summaries depend on the exact wording.

use std::collections::HashMap;

use crate::models::ikigai::{IkigaiCategory, IkigaiData};

pub const TOP_TOKEN_COUNT: usize = 3;

/// Returns the `n` most frequent lower-cased, whitespace-separated tokens
/// across all answers. Ties keep first-encountered order.
pub fn top_tokens(data: &IkigaiData, n: usize) -> Vec<String> {
    let joined = data
        .all_answers()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for token in joined.split_whitespace() {
        match index.get(token).copied() {
            Some(i) => counts[i].1 += 1,
            None => {
                index.insert(token, counts.len());
                counts.push((token, 1));
            }
        }
    }

    // stable sort keeps first-encountered order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(n)
        .map(|(token, _)| token.to_string())
        .collect()
}

pub fn career_suggestion(data: &IkigaiData) -> String {
    format!(
        "focus on a career that combines {}",
        top_tokens(data, TOP_TOKEN_COUNT).join(", ")
    )
}

pub fn generate_summary(data: &IkigaiData) -> String {
    let joined = |c: IkigaiCategory| data.items(c).join(", ");
    format!(
        "Your Ikigai is at the intersection of:\n\
         • What you love: {}\n\
         • What you're good at: {}\n\
         • What the world needs: {}\n\
         • What you can be paid for: {}\n\
         \n\
         This suggests that your ideal path would be to {}.",
        joined(IkigaiCategory::WhatILove),
        joined(IkigaiCategory::WhatImGoodAt),
        joined(IkigaiCategory::WhatTheWorldNeeds),
        joined(IkigaiCategory::WhatICanBePaidFor),
        career_suggestion(data),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(love: &[&str], good: &[&str], needs: &[&str], paid: &[&str]) -> IkigaiData {
        let own = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
        IkigaiData {
            what_i_love: own(love),
            what_im_good_at: own(good),
            what_the_world_needs: own(needs),
            what_i_can_be_paid_for: own(paid),
            summary: None,
        }
    }

    #[test]
    fn test_math_is_top_token() {
        let d = data(&["math"], &["math"], &[], &[]);
        assert_eq!(top_tokens(&d, 3), vec!["math"]);
    }

    #[test]
    fn test_ties_keep_first_encountered_order() {
        let d = data(&["Teaching kids"], &["coding"], &["kids coding"], &["teaching"]);
        // teaching=2, kids=2, coding=2; all tied, so encounter order wins
        assert_eq!(top_tokens(&d, 3), vec!["teaching", "kids", "coding"]);
    }

    #[test]
    fn test_frequency_beats_order() {
        let d = data(&["art"], &["design design"], &["design"], &["art"]);
        assert_eq!(top_tokens(&d, 2), vec!["design", "art"]);
    }

    #[test]
    fn test_empty_data_yields_no_tokens() {
        assert!(top_tokens(&IkigaiData::default(), 3).is_empty());
    }

    #[test]
    fn test_summary_template() {
        let d = data(&["math", "music"], &["math"], &["tutors"], &["tutoring"]);
        let summary = generate_summary(&d);
        assert!(summary.starts_with("Your Ikigai is at the intersection of:\n"));
        assert!(summary.contains("• What you love: math, music\n"));
        assert!(summary.contains("• What you're good at: math\n"));
        assert!(summary.contains("• What the world needs: tutors\n"));
        assert!(summary.contains("• What you can be paid for: tutoring\n\n"));
        assert!(summary.ends_with(
            "This suggests that your ideal path would be to focus on a career that combines math, music, tutors."
        ));
    }
}
