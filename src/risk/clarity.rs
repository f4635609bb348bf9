//! Prompt clarity heuristic, computed from the raw prompt shape only.

/// Clarity score in `0..=100`.
///
/// Starts at 50; +10 for more than 50 chars, +10 for a question mark, +5
/// for "please" or "help", +10 for a newline or full stop.
pub fn clarity_score(prompt: &str) -> u8 {
    let mut score: u8 = 50;
    let lower = prompt.to_lowercase();

    if prompt.chars().count() > 50 {
        score += 10;
    }
    if prompt.contains('?') {
        score += 10;
    }
    if lower.contains("please") || lower.contains("help") {
        score += 5;
    }
    if prompt.contains('\n') || prompt.contains('.') {
        score += 10;
    }

    score.min(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_score() {
        assert_eq!(clarity_score(""), 50);
        assert_eq!(clarity_score("hi"), 50);
    }

    #[test]
    fn test_each_signal() {
        assert_eq!(clarity_score("why"), 50);
        assert_eq!(clarity_score("why?"), 60);
        assert_eq!(clarity_score("help"), 55);
        assert_eq!(clarity_score("done."), 60);
        assert_eq!(clarity_score("line one\nline two"), 60);
    }

    #[test]
    fn test_all_signals() {
        let prompt = "Please help me understand how the billing cycle works for annual plans. Why?";
        assert_eq!(clarity_score(prompt), 85);
    }

    #[test]
    fn test_never_exceeds_100() {
        let long = format!("{} please? help.\n", "x".repeat(500));
        assert!(clarity_score(&long) <= 100);
    }
}
