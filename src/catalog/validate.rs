//! Post-match validators.
//!
//! Regexes over-match: any 16 digits look like a card, any 9 like a routing
//! number. These checks run on the candidate text and reject values that
//! cannot be real.

fn digits(text: &str) -> Vec<u32> {
    text.chars().filter_map(|c| c.to_digit(10)).collect()
}

/// Luhn checksum over 13-19 digits (payment cards)
pub fn luhn(number: &str) -> bool {
    let digits = digits(number);
    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// US SSN structure: area not 000, 666 or 9xx; group not 00; serial not 0000
pub fn ssn(value: &str) -> bool {
    let digits = digits(value);
    if digits.len() != 9 {
        return false;
    }

    let area = digits[0] * 100 + digits[1] * 10 + digits[2];
    let group = digits[3] * 10 + digits[4];
    let serial = digits[5..].iter().fold(0, |acc, d| acc * 10 + d);

    area != 0 && area != 666 && area < 900 && group != 0 && serial != 0
}

/// ABA routing number checksum (weights 3, 7, 1)
pub fn routing_number(value: &str) -> bool {
    let d = digits(value);
    if d.len() != 9 {
        return false;
    }

    let checksum = 3 * (d[0] + d[3] + d[6]) + 7 * (d[1] + d[4] + d[7]) + (d[2] + d[5] + d[8]);
    checksum % 10 == 0
}

/// Identifier-shaped values must carry at least one digit
pub fn contains_digit(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
}

/// Capitalized words that start sentences or name things, not people
const NAME_STOPWORDS: &[&str] = &[
    "A", "About", "After", "All", "Also", "An", "And", "Any", "April", "As", "At", "August",
    "Best", "Call", "Can", "Contact", "Could", "Dear", "December", "Draft", "Email", "February",
    "For", "Friday", "From", "Good", "Hello", "Help", "Hey", "Hi", "How", "If", "In", "Is", "It",
    "January", "July", "June", "Let", "Make", "March", "May", "Monday", "My", "New", "November",
    "October", "Of", "On", "Our", "Please", "Project", "Regards", "Saturday", "See", "September",
    "Send", "Sincerely", "So", "Sunday", "Task", "Thank", "Thanks", "The", "Then", "This",
    "Thursday", "To", "Tuesday", "We", "Wednesday", "What", "When", "Where", "Why", "With",
    "Write", "You", "Your",
];

/// Two capitalized words, neither of which is a common non-name word
pub fn person_name(value: &str) -> bool {
    value
        .split_whitespace()
        .all(|word| !NAME_STOPWORDS.contains(&word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luhn() {
        assert!(luhn("4111111111111111"));
        assert!(luhn("4111-1111-1111-1111"));
        assert!(luhn("378282246310005"));
        assert!(!luhn("4111111111111112"));
        assert!(!luhn("1234"));
    }

    #[test]
    fn test_ssn() {
        assert!(ssn("123-45-6789"));
        assert!(ssn("123456789"));
        assert!(!ssn("000-45-6789"));
        assert!(!ssn("666-45-6789"));
        assert!(!ssn("900-45-6789"));
        assert!(!ssn("123-00-6789"));
        assert!(!ssn("123-45-0000"));
        assert!(!ssn("12-345-678"));
    }

    #[test]
    fn test_routing_number() {
        assert!(routing_number("021000021"));
        assert!(routing_number("011000015"));
        assert!(!routing_number("123456789"));
        assert!(!routing_number("02100002"));
    }

    #[test]
    fn test_person_name() {
        assert!(person_name("John Smith"));
        assert!(person_name("Maria Garcia"));
        assert!(!person_name("Hello World"));
        assert!(!person_name("Dear John"));
        assert!(!person_name("Project Phoenix"));
    }

    #[test]
    fn test_contains_digit() {
        assert!(contains_digit("X1234567"));
        assert!(!contains_digit("ABCDEFG"));
    }
}
