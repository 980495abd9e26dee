use std::collections::HashSet;

/// Canonical lower-case name for a programming language
///
/// Folds common aliases so that "JS", "javascript" and "JavaScript" compare
/// equal.
pub fn normalize_language(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    match lowered.as_str() {
        "js" | "node" | "nodejs" | "node.js" => "javascript".to_string(),
        "ts" => "typescript".to_string(),
        "py" | "python3" => "python".to_string(),
        "golang" => "go".to_string(),
        "c++" | "cxx" => "cpp".to_string(),
        "c#" | "cs" => "csharp".to_string(),
        "rs" => "rust".to_string(),
        _ => lowered,
    }
}

/// Normalized, de-duplicated set of language names
pub fn language_set<S: AsRef<str>>(languages: &[S]) -> HashSet<String> {
    languages
        .iter()
        .map(|l| normalize_language(l.as_ref()))
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_fold() {
        assert_eq!(normalize_language("JS"), "javascript");
        assert_eq!(normalize_language(" Golang "), "go");
        assert_eq!(normalize_language("C++"), "cpp");
        assert_eq!(normalize_language("Python"), "python");
    }

    #[test]
    fn test_language_set_dedupes() {
        let set = language_set(&["JS", "javascript", "Go", ""]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("javascript"));
        assert!(set.contains("go"));
    }
}
