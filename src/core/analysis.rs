use crate::core::language::normalize_language;
use crate::error::{Result, ScoringError};
use crate::models::AnalysisSignals;

/// Extracts grading signals from source text
///
/// Implementations must fail with `UnparsableSubmission` rather than return
/// signals for code they cannot process.
pub trait StaticAnalyzer: Send + Sync {
    fn analyze(&self, source_text: &str, expected_language: &str) -> Result<AnalysisSignals>;
}

const IDEAL_BRANCHES_PER_FUNCTION: f64 = 10.0;
const MAX_BRANCHES_PER_FUNCTION: f64 = 30.0;
const LONG_LINE_CHARS: usize = 120;

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "elif", "for", "while", "loop", "switch", "match", "case", "select", "catch", "except",
];

/// Line-based analyzer used when no remote analyzer is configured
///
/// Full parsing is out of reach here; keyword and bracket heuristics are
/// close enough for rubric grading.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer;

impl StaticAnalyzer for HeuristicAnalyzer {
    fn analyze(&self, source_text: &str, expected_language: &str) -> Result<AnalysisSignals> {
        if source_text.trim().is_empty() {
            return Err(ScoringError::UnparsableSubmission(
                "submission is empty".to_string(),
            ));
        }

        let expected = normalize_language(expected_language);
        let detected = detect_language(source_text);
        let language_match = detected
            .map(|d| languages_compatible(&expected, d))
            .unwrap_or(false);

        // Count with the rules of whatever the code actually is
        let language = match detected {
            Some(d) if !language_match => d,
            _ => expected.as_str(),
        };
        let syntax = Syntax::for_language(language);

        check_balanced(source_text, &syntax)?;

        let mut function_count = 0u32;
        let mut control_structure_count = 0u32;
        let mut comment_lines = 0usize;
        let mut code_lines = 0usize;
        let mut long_lines = 0usize;
        let mut tab_indented = 0usize;
        let mut space_indented = 0usize;

        for line in source_text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if line.chars().count() > LONG_LINE_CHARS {
                long_lines += 1;
            }
            if syntax.is_comment(trimmed) {
                comment_lines += 1;
                continue;
            }

            code_lines += 1;
            if line.starts_with('\t') {
                tab_indented += 1;
            } else if line.starts_with(' ') {
                space_indented += 1;
            }

            if is_function_declaration(trimmed, language) {
                function_count += 1;
            }
            control_structure_count += count_control_keywords(syntax.strip_comment(trimmed));
        }

        if code_lines == 0 {
            return Err(ScoringError::UnparsableSubmission(
                "submission contains only comments".to_string(),
            ));
        }

        let non_blank = (comment_lines + code_lines) as f64;
        let comment_ratio = comment_lines as f64 / non_blank;

        let complexity_score = if function_count == 0 && control_structure_count == 0 {
            0.0
        } else {
            let per_function = control_structure_count as f64 / function_count.max(1) as f64;
            if per_function <= IDEAL_BRANCHES_PER_FUNCTION {
                1.0
            } else if per_function >= MAX_BRANCHES_PER_FUNCTION {
                0.0
            } else {
                (MAX_BRANCHES_PER_FUNCTION - per_function)
                    / (MAX_BRANCHES_PER_FUNCTION - IDEAL_BRANCHES_PER_FUNCTION)
            }
        };

        let function_part = if function_count > 0 { 0.4 } else { 0.0 };
        let indentation_part = if tab_indented > 0 && space_indented > 0 { 0.0 } else { 0.3 };
        let line_length_part = 0.3 * (1.0 - long_lines as f64 / non_blank);
        let structure_score = function_part + indentation_part + line_length_part;

        Ok(AnalysisSignals {
            language_match,
            function_count,
            control_structure_count,
            comment_ratio,
            complexity_score,
            structure_score,
        })
    }
}

/// Comment and string conventions of a language family
#[derive(Debug, Clone, Copy)]
struct Syntax {
    line_comment: &'static str,
    block_comments: bool,
    docstrings: bool,
    /// Quotes whose strings end at the line break
    quotes: &'static [char],
    /// Delimiters of strings that may span lines
    multiline_quotes: &'static [&'static str],
    /// Backslash escapes apply inside multi-line strings
    multiline_escapes: bool,
    char_literals: bool,
}

impl Syntax {
    fn for_language(language: &str) -> Self {
        match language {
            "python" => Self {
                line_comment: "#",
                block_comments: false,
                docstrings: true,
                quotes: &['"', '\''],
                multiline_quotes: &["\"\"\"", "'''"],
                multiline_escapes: true,
                char_literals: false,
            },
            "rust" => Self {
                line_comment: "//",
                block_comments: true,
                docstrings: false,
                quotes: &[],
                multiline_quotes: &["\""],
                multiline_escapes: true,
                char_literals: true,
            },
            "javascript" | "typescript" => Self {
                line_comment: "//",
                block_comments: true,
                docstrings: false,
                quotes: &['"', '\''],
                multiline_quotes: &["`"],
                multiline_escapes: true,
                char_literals: false,
            },
            "go" => Self {
                line_comment: "//",
                block_comments: true,
                docstrings: false,
                quotes: &['"', '\''],
                multiline_quotes: &["`"],
                multiline_escapes: false,
                char_literals: false,
            },
            _ => Self {
                line_comment: "//",
                block_comments: true,
                docstrings: false,
                quotes: &['"', '\''],
                multiline_quotes: &[],
                multiline_escapes: false,
                char_literals: false,
            },
        }
    }

    fn is_comment(&self, trimmed: &str) -> bool {
        if trimmed.starts_with(self.line_comment) {
            return true;
        }
        if self.block_comments && (trimmed.starts_with("/*") || trimmed.starts_with('*')) {
            return true;
        }
        self.docstrings && (trimmed.starts_with("\"\"\"") || trimmed.starts_with("'''"))
    }

    fn strip_comment<'a>(&self, trimmed: &'a str) -> &'a str {
        match trimmed.find(self.line_comment) {
            Some(idx) => &trimmed[..idx],
            None => trimmed,
        }
    }
}

/// Where the bracket scanner currently is
#[derive(Debug, Clone, Copy)]
enum Scan {
    Code,
    LineComment,
    BlockComment { opened: usize },
    String { quote: char },
    MultilineString { delimiter: &'static str, opened: usize },
}

fn starts_with_at(chars: &[char], at: usize, pattern: &str) -> bool {
    pattern
        .chars()
        .enumerate()
        .all(|(k, p)| chars.get(at + k) == Some(&p))
}

/// Verify brackets pair up outside strings and comments
///
/// Scans the whole source at once so strings and block comments may span
/// lines.
fn check_balanced(source: &str, syntax: &Syntax) -> Result<()> {
    let chars: Vec<char> = source.chars().collect();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut scan = Scan::Code;
    let mut line_no = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        if c == '\n' {
            line_no += 1;
        }

        match scan {
            Scan::LineComment => {
                if c == '\n' {
                    scan = Scan::Code;
                }
            }
            Scan::BlockComment { .. } => {
                if c == '*' && next == Some('/') {
                    scan = Scan::Code;
                    i += 2;
                    continue;
                }
            }
            Scan::String { quote } => {
                if c == '\\' {
                    if next == Some('\n') {
                        line_no += 1;
                    }
                    i += 2;
                    continue;
                }
                // Single-line strings end at the quote or the line break
                if c == quote || c == '\n' {
                    scan = Scan::Code;
                }
            }
            Scan::MultilineString { delimiter, .. } => {
                if syntax.multiline_escapes && c == '\\' {
                    if next == Some('\n') {
                        line_no += 1;
                    }
                    i += 2;
                    continue;
                }
                if starts_with_at(&chars, i, delimiter) {
                    scan = Scan::Code;
                    i += delimiter.chars().count();
                    continue;
                }
            }
            Scan::Code => {
                if syntax.block_comments && c == '/' && next == Some('*') {
                    scan = Scan::BlockComment { opened: line_no };
                    i += 2;
                    continue;
                }
                if starts_with_at(&chars, i, syntax.line_comment) {
                    scan = Scan::LineComment;
                    i += 1;
                    continue;
                }
                if let Some(delimiter) = syntax
                    .multiline_quotes
                    .iter()
                    .copied()
                    .find(|d| starts_with_at(&chars, i, d))
                {
                    scan = Scan::MultilineString {
                        delimiter,
                        opened: line_no,
                    };
                    i += delimiter.chars().count();
                    continue;
                }

                if syntax.char_literals && c == '\'' {
                    // 'x' or '\n'; anything else is a lifetime
                    if chars.get(i + 2) == Some(&'\'') {
                        i += 3;
                        continue;
                    }
                    if next == Some('\\') && chars.get(i + 3) == Some(&'\'') {
                        i += 4;
                        continue;
                    }
                    i += 1;
                    continue;
                }

                if syntax.quotes.contains(&c) {
                    scan = Scan::String { quote: c };
                    i += 1;
                    continue;
                }

                match c {
                    '(' | '[' | '{' => stack.push((c, line_no)),
                    ')' | ']' | '}' => {
                        let opener = match c {
                            ')' => '(',
                            ']' => '[',
                            _ => '{',
                        };
                        match stack.pop() {
                            Some((open, _)) if open == opener => {}
                            _ => {
                                return Err(ScoringError::UnparsableSubmission(format!(
                                    "unexpected '{}' on line {}",
                                    c, line_no
                                )));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        i += 1;
    }

    match scan {
        Scan::BlockComment { opened } => {
            return Err(ScoringError::UnparsableSubmission(format!(
                "block comment opened on line {} is never closed",
                opened
            )));
        }
        Scan::MultilineString { opened, .. } => {
            return Err(ScoringError::UnparsableSubmission(format!(
                "string opened on line {} is never closed",
                opened
            )));
        }
        _ => {}
    }
    if let Some((open, line_no)) = stack.last() {
        return Err(ScoringError::UnparsableSubmission(format!(
            "'{}' opened on line {} is never closed",
            open, line_no
        )));
    }

    Ok(())
}

fn count_control_keywords(code: &str) -> u32 {
    code.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|word| CONTROL_KEYWORDS.contains(word))
        .count() as u32
}

fn first_word(line: &str) -> &str {
    line.split(|c: char| !c.is_alphanumeric() && c != '_')
        .next()
        .unwrap_or("")
}

fn is_function_declaration(line: &str, language: &str) -> bool {
    match language {
        "python" => line.starts_with("def ") || line.starts_with("async def "),
        "rust" => {
            (line.starts_with("fn ") || line.contains(" fn ")) && line.contains('(')
        }
        "go" => line.starts_with("func "),
        "javascript" | "typescript" => {
            line.contains("function ")
                || line.contains("function(")
                || (line.contains("=>")
                    && (line.starts_with("const ")
                        || line.starts_with("let ")
                        || line.starts_with("var ")
                        || line.starts_with("export const ")))
                || is_method_signature(line)
        }
        _ => is_method_signature(line),
    }
}

/// `name(args) {` style signature that is not a control statement or a call
fn is_method_signature(line: &str) -> bool {
    let head = first_word(line);
    line.ends_with('{')
        && line.contains('(')
        && !line.contains('=')
        && !line.starts_with('}')
        && !CONTROL_KEYWORDS.contains(&head)
        && !matches!(head, "else" | "return" | "new" | "do" | "try" | "class")
}

/// Guess a submission's language from distinctive syntax
pub fn detect_language(source: &str) -> Option<&'static str> {
    const ORDER: [&str; 8] = ["python", "rust", "go", "javascript", "typescript", "java", "cpp", "c"];
    let mut counts = [0usize; 8];

    for line in source.lines() {
        let t = line.trim();
        if t.is_empty() {
            continue;
        }

        // python
        if t.starts_with("def ")
            || t.starts_with("elif ")
            || (t.starts_with("from ") && t.contains(" import "))
            || t.contains("self.")
            || (t.ends_with(':')
                && matches!(first_word(t), "if" | "for" | "while" | "class" | "else" | "try" | "except" | "with"))
        {
            counts[0] += 1;
        }
        // rust
        if t.starts_with("fn ")
            || t.starts_with("pub fn ")
            || t.starts_with("impl ")
            || t.contains("let mut ")
            || t.contains("println!")
            || (t.starts_with("use ") && t.contains("::"))
        {
            counts[1] += 1;
        }
        // go
        if t.starts_with("func ") || t.starts_with("package ") || t.contains(":=") || t.contains("fmt.") {
            counts[2] += 1;
        }
        // javascript
        if t.starts_with("function ")
            || t.contains("console.")
            || t.contains("===")
            || t.contains("require(")
            || ((t.starts_with("const ") || t.starts_with("let ")) && t.contains("=>"))
        {
            counts[3] += 1;
        }
        // typescript
        if t.starts_with("interface ")
            || t.starts_with("export type ")
            || t.contains(": string")
            || t.contains(": number")
        {
            counts[4] += 1;
        }
        // java
        if t.contains("public class") || t.contains("System.out") || t.contains("public static void") {
            counts[5] += 1;
        }
        // cpp
        if t.contains("std::cout") || t.contains("cout <<") || t.starts_with("#include <iostream>") {
            counts[6] += 1;
        }
        // c
        if t.starts_with("#include") || t.contains("printf(") {
            counts[7] += 1;
        }
    }

    // TypeScript is JavaScript plus annotations
    if counts[4] > 0 {
        counts[4] += counts[3];
    }

    let mut best: Option<usize> = None;
    for (idx, count) in counts.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        match best {
            Some(b) if counts[b] >= *count => {}
            _ => best = Some(idx),
        }
    }

    best.map(|idx| ORDER[idx])
}

/// Whether code detected as `detected` satisfies a requirement for `expected`
fn languages_compatible(expected: &str, detected: &str) -> bool {
    expected == detected
        || (expected == "typescript" && detected == "javascript")
        || (expected == "cpp" && detected == "c")
        || (expected == "c" && detected == "cpp")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYTHON_SOLUTION: &str = r#"# Compute statistics for a list of numbers.
def mean(values):
    """Return the arithmetic mean."""
    if not values:
        return 0
    return sum(values) / len(values)


def classify(values):
    # Label each value relative to the mean.
    avg = mean(values)
    labels = []
    for v in values:
        if v > avg:
            labels.append("high")
        elif v < avg:
            labels.append("low")
        else:
            labels.append("avg")
    return labels
"#;

    #[test]
    fn test_python_solution_signals() {
        let signals = HeuristicAnalyzer.analyze(PYTHON_SOLUTION, "Python").unwrap();

        assert!(signals.language_match);
        assert_eq!(signals.function_count, 2);
        assert_eq!(signals.control_structure_count, 4);
        assert!(signals.comment_ratio > 0.1);
        assert_eq!(signals.complexity_score, 1.0);
        assert!((signals.structure_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_language_detected() {
        let signals = HeuristicAnalyzer.analyze(PYTHON_SOLUTION, "rust").unwrap();
        assert!(!signals.language_match);
    }

    #[test]
    fn test_unbalanced_braces_unparsable() {
        let source = "function f(x) {\n  if (x > 1 {\n    return x;\n  }\n}\n";
        let err = HeuristicAnalyzer.analyze(source, "javascript").unwrap_err();
        assert!(matches!(err, ScoringError::UnparsableSubmission(_)));
    }

    #[test]
    fn test_empty_submission_unparsable() {
        assert!(matches!(
            HeuristicAnalyzer.analyze("   \n\n", "python"),
            Err(ScoringError::UnparsableSubmission(_))
        ));
    }

    #[test]
    fn test_brackets_in_strings_and_comments_ignored() {
        let source = "// closing ) in a comment\nfunction greet(name) {\n  return \"hi {\" + name;\n}\n";
        let signals = HeuristicAnalyzer.analyze(source, "js").unwrap();
        assert!(signals.language_match);
        assert_eq!(signals.function_count, 1);
    }

    #[test]
    fn test_rust_lifetimes_and_char_literals() {
        let source = "fn first<'a>(s: &'a str) -> char {\n    let mut it = s.chars();\n    it.find(|c| *c != '{').unwrap_or(' ')\n}\n";
        let signals = HeuristicAnalyzer.analyze(source, "rust").unwrap();
        assert!(signals.language_match);
        assert_eq!(signals.function_count, 1);
    }

    #[test]
    fn test_docstring_spanning_lines() {
        let source = "def display_name(user):\n    \"\"\"Look up a user.\n\n    Returns (the user's display name).\n    \"\"\"\n    return user.get(\"name\", \"anonymous\")\n";
        let signals = HeuristicAnalyzer.analyze(source, "python").unwrap();
        assert!(signals.language_match);
        assert_eq!(signals.function_count, 1);
    }

    #[test]
    fn test_unterminated_docstring_unparsable() {
        let source = "def f():\n    \"\"\"Never closed.\n    return 1\n";
        assert!(matches!(
            HeuristicAnalyzer.analyze(source, "python"),
            Err(ScoringError::UnparsableSubmission(_))
        ));
    }

    #[test]
    fn test_template_literal_spanning_lines() {
        let source = "function greet(user) {\n  return `Hello ${user.name}!\nDon't forget: (this paren is text\n`;\n}\n";
        let signals = HeuristicAnalyzer.analyze(source, "javascript").unwrap();
        assert_eq!(signals.function_count, 1);
    }

    #[test]
    fn test_go_raw_string_ignores_backslashes() {
        let source = "package main\n\nfunc pattern() string {\n\treturn `C:\\path\\\n(`\n}\n";
        let signals = HeuristicAnalyzer.analyze(source, "go").unwrap();
        assert!(signals.language_match);
        assert_eq!(signals.function_count, 1);
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("package main\nfunc main() {\n  x := 1\n}"), Some("go"));
        assert_eq!(
            detect_language("interface User {\n  name: string;\n}\nconst f = (u: User) => u.name;"),
            Some("typescript")
        );
        assert_eq!(detect_language("x"), None);
    }
}
