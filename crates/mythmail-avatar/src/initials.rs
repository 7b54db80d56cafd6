/// Two-letter badge text for a sender.
///
/// A name with several words yields the first letters of the first and last
/// word; a single word yields its first two letters. Without a usable name
/// the first two characters of the address are used.
pub fn compute_initials(email: &str, name: Option<&str>) -> String {
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        let parts: Vec<&str> = name.split_whitespace().collect();
        if let [first, .., last] = parts.as_slice() {
            return first
                .chars()
                .take(1)
                .chain(last.chars().take(1))
                .flat_map(char::to_uppercase)
                .collect();
        }
        return upper_prefix(name, 2);
    }
    let initials = upper_prefix(email.trim().trim_matches(['<', '>']), 2);
    if initials.trim().is_empty() {
        return PLACEHOLDER.to_string();
    }
    initials
}

/// Badge text when neither a name nor an address is available.
pub const PLACEHOLDER: &str = "?";

fn upper_prefix(value: &str, len: usize) -> String {
    value.chars().take(len).flat_map(char::to_uppercase).collect()
}
