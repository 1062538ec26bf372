use proptest::prelude::*;

use fsdir::parser::lexer::tokenize;
use fsdir::parser::{ParseErrorKind, Parser};

proptest! {
    /// The lexer either tokenizes or reports a syntax error; it never panics
    /// and every token lies inside the source.
    #[test]
    fn lexer_total_over_arbitrary_input(source in "\\PC{0,64}") {
        match tokenize(&source, 0) {
            Ok(tokens) => {
                for token in tokens {
                    prop_assert!(token.span().end <= source.len());
                    prop_assert!(source.is_char_boundary(token.offset));
                }
            }
            Err(err) => prop_assert_eq!(err.kind, ParseErrorKind::Syntax),
        }
    }

    /// Well-formed single statements always parse back to their parts.
    #[test]
    fn generated_statements_parse(
        directive in "[A-Z]{1,8}",
        paths in prop::collection::vec("[a-z0-9_./]{1,12}", 1..4),
    ) {
        let quoted: Vec<String> = paths.iter().map(|p| format!("'{}'", p)).collect();
        let source = format!("{} {}\n", directive, quoted.join(" "));
        let script = Parser::new(source, 0).parse().expect("parse failed");
        prop_assert_eq!(script.commands.len(), 1);
        prop_assert_eq!(&script.commands[0].directive, &directive);
        prop_assert_eq!(&script.commands[0].directive_params, &paths);
    }
}
