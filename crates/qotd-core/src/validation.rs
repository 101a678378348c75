//! Field-presence rules applied before any write

use crate::{Comment, QotdError, Quote, Result};

pub fn validate_quote(quote: &Quote) -> Result<()> {
    if quote.author.is_empty() {
        return Err(QotdError::Validation { field: "Author" });
    }
    if quote.text.is_empty() {
        return Err(QotdError::Validation { field: "Text" });
    }
    Ok(())
}

pub fn validate_comment(comment: &Comment) -> Result<()> {
    if comment.author.is_empty() {
        return Err(QotdError::Validation { field: "Author" });
    }
    if comment.content.is_empty() {
        return Err(QotdError::Validation { field: "Content" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_field(result: Result<()>) -> &'static str {
        match result {
            Err(QotdError::Validation { field }) => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_quote_rules() {
        assert!(validate_quote(&Quote::new("Seneca", "Luck is preparation.")).is_ok());
        assert_eq!(missing_field(validate_quote(&Quote::new("", "text"))), "Author");
        assert_eq!(missing_field(validate_quote(&Quote::new("Seneca", ""))), "Text");
        // Author is reported first when both are missing
        assert_eq!(missing_field(validate_quote(&Quote::default())), "Author");
    }

    #[test]
    fn test_comment_rules() {
        assert!(validate_comment(&Comment::new("Ada", "Lovely")).is_ok());
        assert_eq!(missing_field(validate_comment(&Comment::new("", "Lovely"))), "Author");
        assert_eq!(missing_field(validate_comment(&Comment::new("Ada", ""))), "Content");
    }
}
