use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::domain::Question;

static QUESTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:Q:|Q\.)?\s*(.*)$").unwrap());
static OPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[A-Da-d][).:]\s*(.*)$").unwrap());
static ANSWER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*ANSWER\s*[:\-]\s*([A-D0-3])").unwrap());

const MAX_OPTIONS: usize = 4;

/// Parses plain-text multiple choice questions.
///
/// ```text
/// Q: 2 + 2 = ?
/// A) 3
/// B) 4
/// ANSWER: B
/// ```
///
/// Blocks are separated by blank lines. Blocks with fewer than two options,
/// or whose answer names an option that is not there, are dropped. A missing
/// answer defaults to the first option.
pub fn parse_mcq_txt(content: &str) -> Vec<Question> {
    let lines: Vec<&str> = content.lines().collect();
    let mut questions = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        while i < lines.len() && lines[i].trim().is_empty() {
            i += 1;
        }
        if i >= lines.len() {
            break;
        }

        let line = lines[i];
        i += 1;
        let text = QUESTION_RE
            .captures(line)
            .and_then(|c| c.get(1))
            .map_or(line, |m| m.as_str())
            .trim()
            .to_string();

        let mut opts = Vec::new();
        while opts.len() < MAX_OPTIONS && i < lines.len() {
            match OPTION_RE.captures(lines[i]).and_then(|c| c.get(1)) {
                Some(m) => {
                    opts.push(m.as_str().trim().to_string());
                    i += 1;
                }
                None => break,
            }
        }

        let mut answer = 0;
        while i < lines.len() {
            if let Some(token) = ANSWER_RE.captures(lines[i]).and_then(|c| c.get(1)) {
                answer = answer_index(token.as_str());
                i += 1;
                break;
            }
            if lines[i].trim().is_empty() {
                i += 1;
                break;
            }
            i += 1;
        }

        if text.is_empty() || opts.len() < 2 {
            continue;
        }
        if answer as usize >= opts.len() {
            log::warn!("Dropping question '{}': answer names a missing option", text);
            continue;
        }
        questions.push(Question::mcq(&text, opts, answer));
    }

    questions
}

fn answer_index(token: &str) -> i32 {
    match token.to_ascii_uppercase().as_bytes() {
        [b @ b'A'..=b'D'] => i32::from(b - b'A'),
        [d @ b'0'..=b'3'] => i32::from(d - b'0'),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::QuestionType;

    #[test]
    fn parses_blocks_separated_by_blank_lines() {
        let content = "Q: 2 + 2 = ?\nA) 3\nB) 4\nC) 5\nD) 6\nANSWER: B\n\nQ. Capital of France?\na. Paris\nb: Rome\nanswer - 0\n";
        let questions = parse_mcq_txt(content);

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question_type, QuestionType::Mcq);
        assert_eq!(questions[0].q.as_deref(), Some("2 + 2 = ?"));
        assert_eq!(questions[0].opts, vec!["3", "4", "5", "6"]);
        assert_eq!(questions[0].answer, Some(1));
        assert_eq!(questions[1].q.as_deref(), Some("Capital of France?"));
        assert_eq!(questions[1].opts, vec!["Paris", "Rome"]);
        assert_eq!(questions[1].answer, Some(0));
    }

    #[test]
    fn handles_windows_line_endings_and_missing_prefix() {
        let content = "Which is even?\r\nA) 1\r\nB) 2\r\nANSWER: 1\r\n";
        let questions = parse_mcq_txt(content);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].q.as_deref(), Some("Which is even?"));
        assert_eq!(questions[0].opts, vec!["1", "2"]);
        assert_eq!(questions[0].answer, Some(1));
    }

    #[test]
    fn drops_blocks_with_fewer_than_two_options() {
        let content = "Q: Lonely?\nA) yes\nANSWER: A\n\nQ: Pick\nA) x\nB) y\nANSWER: A\n";
        let questions = parse_mcq_txt(content);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].q.as_deref(), Some("Pick"));
    }

    #[test]
    fn drops_blocks_whose_answer_names_a_missing_option() {
        let content = "Q: x\nA) one\nB) two\nANSWER: D\n\nQ: y\nA) one\nB) two\nC) three\nANSWER: C\n";
        let questions = parse_mcq_txt(content);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].q.as_deref(), Some("y"));
        assert_eq!(questions[0].answer, Some(2));
    }

    #[test]
    fn missing_answer_defaults_to_first_option() {
        let content = "Q: No answer\nA) x\nB) y\n";
        let questions = parse_mcq_txt(content);

        assert_eq!(questions[0].answer, Some(0));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_mcq_txt("").is_empty());
        assert!(parse_mcq_txt("\n\n   \n").is_empty());
    }

    #[test]
    fn parsed_questions_get_distinct_ids() {
        let content = "Q: a\nA) 1\nB) 2\n\nQ: b\nA) 1\nB) 2\n";
        let questions = parse_mcq_txt(content);
        assert_ne!(questions[0].id, questions[1].id);
    }
}
