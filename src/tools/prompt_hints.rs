//! Advisory checks on image prompts. They only add hints to the response.

const MAX_CONCISE_CHARS: usize = 200;
const MAX_FOREIGN_RATIO: f64 = 0.2;

const NON_ENGLISH_HINT: &str =
    "提示：Pollinations.ai对英文提示词的理解更好，建议使用英文编写提示词。\n";
const TOO_LONG_HINT: &str =
    "提示：提示词过长可能影响生成效果，建议保持简短精确（建议不超过200字符）。\n";

fn is_english_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || ch.is_whitespace()
        || matches!(ch, '.' | ',' | ';' | ':' | '\'' | '"' | '!' | '?' | '(' | ')' | '-')
}

pub fn is_mainly_english(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return false;
    }
    let foreign = text.chars().filter(|ch| !is_english_char(*ch)).count();
    foreign == 0 || (foreign as f64 / total as f64) < MAX_FOREIGN_RATIO
}

pub fn is_concise(text: &str) -> bool {
    text.chars().count() <= MAX_CONCISE_CHARS
}

/// Hint text to show ahead of the generated URL, if any.
pub fn prompt_feedback(prompt: &str) -> Option<String> {
    let mut feedback = String::new();
    if !is_mainly_english(prompt) {
        feedback.push_str(NON_ENGLISH_HINT);
    }
    if !is_concise(prompt) {
        feedback.push_str(TOO_LONG_HINT);
    }
    if feedback.is_empty() { None } else { Some(feedback) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_prompts() {
        assert!(is_mainly_english("Hello, world!"));
        assert!(is_mainly_english("A cat (orange) - sitting; \"cute\"?"));
    }

    #[test]
    fn chinese_prompt_is_not_english() {
        assert!(!is_mainly_english("你好世界"));
    }

    #[test]
    fn small_share_of_foreign_characters_is_tolerated() {
        // 1 foreign char out of 10
        assert!(is_mainly_english("abcdefghi@"));
        // 2 out of 10 is exactly the threshold
        assert!(!is_mainly_english("abcdefgh@#"));
    }

    #[test]
    fn empty_prompt_is_not_english() {
        assert!(!is_mainly_english(""));
    }

    #[test]
    fn conciseness_counts_characters() {
        assert!(is_concise(&"a".repeat(200)));
        assert!(!is_concise(&"a".repeat(201)));
        assert!(is_concise(&"猫".repeat(200)));
    }

    #[test]
    fn feedback_combines_hints() {
        assert_eq!(prompt_feedback("a cat"), None);
        let feedback = prompt_feedback(&"猫".repeat(201)).unwrap();
        assert!(feedback.contains("英文"));
        assert!(feedback.contains("200字符"));
    }
}
