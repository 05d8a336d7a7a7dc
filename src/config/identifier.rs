use crate::util::list_display;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum IdentifierError {
    Empty,
    NotAsciiAlphanumericOrHyphen { bad_chars: Vec<char> },
    HyphenAtLabelEdge { label: String },
    StartsOrEndsWithADot,
    EmptyLabel,
}

impl Error for IdentifierError {}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Identifier can't be empty."),
            Self::NotAsciiAlphanumericOrHyphen { bad_chars } => write!(
                f,
                "{} characters were used in identifier, but only ASCII letters, numbers, and hyphens are allowed.",
                list_display(
                    &bad_chars
                        .iter()
                        .map(|c| format!("'{}'", c))
                        .collect::<Vec<_>>()
                ),
            ),
            Self::HyphenAtLabelEdge { label } => write!(
                f,
                "\"{}\" label starts or ends with a hyphen, which isn't allowed in bundle identifiers.",
                label
            ),
            Self::StartsOrEndsWithADot => write!(f, "Identifier can't start or end with a dot."),
            Self::EmptyLabel => write!(f, "Labels can't be empty."),
        }
    }
}

pub fn check_identifier_syntax(identifier_name: &str) -> Result<(), IdentifierError> {
    if identifier_name.is_empty() {
        return Err(IdentifierError::Empty);
    }
    if identifier_name.starts_with('.') || identifier_name.ends_with('.') {
        return Err(IdentifierError::StartsOrEndsWithADot);
    }
    let labels = identifier_name.split('.');
    for label in labels {
        if label.is_empty() {
            return Err(IdentifierError::EmptyLabel);
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(IdentifierError::HyphenAtLabelEdge {
                label: label.to_owned(),
            });
        }
        let mut bad_chars = Vec::new();
        for c in label.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && !bad_chars.contains(&c) {
                bad_chars.push(c);
            }
        }
        if !bad_chars.is_empty() {
            return Err(IdentifierError::NotAsciiAlphanumericOrHyphen { bad_chars });
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest(
        input,
        case("com.example"),
        case("com.example.NotificationService"),
        case("com.example-app.Service2"),
        case("t2900.e1.s709.t1000"),
        case("io.2fa.helper")
    )]
    fn test_check_identifier_syntax_correct(input: &str) {
        check_identifier_syntax(input).unwrap();
    }

    #[rstest(input, error,
        case("ラスト.テスト", IdentifierError::NotAsciiAlphanumericOrHyphen { bad_chars: vec!['ラ', 'ス', 'ト'] }),
        case("com.exa mple", IdentifierError::NotAsciiAlphanumericOrHyphen { bad_chars: vec![' '] }),
        case("", IdentifierError::Empty {}),
        case(".bad.dot.syntax", IdentifierError::StartsOrEndsWithADot {}),
        case("trailing.dot.", IdentifierError::StartsOrEndsWithADot {}),
        case("com.-example.app", IdentifierError::HyphenAtLabelEdge { label: String::from("-example") }),
        case("com..empty.label", IdentifierError::EmptyLabel)
    )]
    fn test_check_identifier_syntax_error(input: &str, error: IdentifierError) {
        assert_eq!(
            check_identifier_syntax(input).unwrap_err().to_string(),
            error.to_string()
        )
    }
}
