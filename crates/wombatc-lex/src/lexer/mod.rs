//! Lexer module.
//!
//! The implementation is split into focused components:
//! - `core` - main `Lexer` struct and dispatch
//! - `identifier` - identifier, keyword, and readable lexing
//! - `number` - numeric literal lexing
//! - `string` - string and character literal lexing
//! - `operator` - punctuation and compound operator lexing
//! - `comment` - line comment skipping

mod comment;
mod core;
mod identifier;
mod number;
mod operator;
mod string;

pub use core::Lexer;

#[cfg(test)]
mod tests {
    use crate::token::{LiteralKind, TokenKind, TokenStream};
    use crate::lex_text;
    use proptest::prelude::*;
    use wombatc_util::{Handler, Location};

    fn lex(src: &str) -> (TokenStream, Handler) {
        let handler = Handler::new();
        let (stream, _) = lex_text("test.wo", src, &handler);
        (stream, handler)
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).0.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_stream_always_ends_with_one_eof() {
        for src in ["", "let x", "# only a comment", "1 + 2"] {
            let (stream, _) = lex(src);
            let eofs = stream.iter().filter(|t| t.kind == TokenKind::Eof).count();
            assert_eq!(eofs, 1, "source: {src:?}");
            assert_eq!(stream.iter().last().unwrap().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn test_token_locations_point_into_source() {
        let src = "fn int main()\n  return 1;\nend";
        let lines: Vec<&str> = src.lines().collect();
        let (stream, _) = lex(src);

        for token in stream.iter().filter(|t| t.kind != TokenKind::Eof) {
            let line = lines[token.loc.line];
            let at: String = line.chars().skip(token.loc.col).collect();
            let quoteless = match token.kind {
                TokenKind::LiteralString | TokenKind::LiteralChar => continue,
                _ => token.lexeme.as_str(),
            };
            assert!(
                at.starts_with(quoteless),
                "token {:?} not found at {:?} in {line:?}",
                token.lexeme,
                token.loc
            );
        }
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let (stream, _) = lex("let mutant: int");
        let toks: Vec<_> = stream.iter().collect();
        assert_eq!(toks[0].kind, TokenKind::Keyword);
        assert_eq!(toks[0].lexeme, "let");
        // 'mutant' starts with 'mut' but must lex as one identifier.
        assert_eq!(toks[1].kind, TokenKind::Identifier);
        assert_eq!(toks[1].lexeme, "mutant");
    }

    #[test]
    fn test_boolean_literals() {
        let (stream, _) = lex("true false");
        let toks: Vec<_> = stream.iter().collect();
        assert_eq!(toks[0].kind, TokenKind::LiteralBoolean);
        assert_eq!(toks[1].kind, TokenKind::LiteralBoolean);
        assert_eq!(toks[0].literal_kind(), Some(LiteralKind::Bool));
    }

    #[test]
    fn test_readable_tokens() {
        let (stream, _) = lex("mem! x");
        let toks: Vec<_> = stream.iter().collect();
        assert_eq!(toks[0].kind, TokenKind::Readable);
        assert_eq!(toks[0].lexeme, "mem!");
        assert_eq!(toks[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_number_literals() {
        let (stream, _) = lex("42 3.14 7.");
        let toks: Vec<_> = stream.iter().collect();
        assert_eq!(toks[0].kind, TokenKind::LiteralNum);
        assert_eq!(toks[0].lexeme, "42");
        assert_eq!(toks[1].kind, TokenKind::LiteralFloat);
        assert_eq!(toks[1].lexeme, "3.14");
        // A dot with no digits after it is not part of the number.
        assert_eq!(toks[2].kind, TokenKind::LiteralNum);
        assert_eq!(toks[2].lexeme, "7");
        assert_eq!(toks[3].kind, TokenKind::Dot);
    }

    #[test]
    fn test_string_literal_keeps_quotes() {
        let (stream, handler) = lex(r#""hello""#);
        let tok = stream.iter().next().unwrap();
        assert_eq!(tok.kind, TokenKind::LiteralString);
        assert_eq!(tok.lexeme, "\"hello\"");
        assert!(!handler.has_criticals());
    }

    #[test]
    fn test_string_escapes() {
        let (stream, handler) = lex(r#""a\n\\\"b""#);
        let tok = stream.iter().next().unwrap();
        assert_eq!(tok.kind, TokenKind::LiteralString);
        assert!(!handler.has_criticals());
    }

    #[test]
    fn test_invalid_escape_is_critical() {
        let (_, handler) = lex(r#""bad\qseq""#);
        assert!(handler.has_criticals());
        let diags = handler.diagnostics();
        assert!(diags[0].message.contains("unexpected escape sequence"));
        assert!(!diags[0].labels.is_empty());
    }

    #[test]
    fn test_unterminated_string_is_critical() {
        let (_, handler) = lex("\"no end");
        assert!(handler.has_criticals());
        assert!(handler.diagnostics()[0]
            .message
            .contains("unterminated string literal"));
    }

    #[test]
    fn test_char_literals() {
        let (stream, handler) = lex("'a' ''");
        let toks: Vec<_> = stream.iter().collect();
        assert_eq!(toks[0].kind, TokenKind::LiteralChar);
        assert_eq!(toks[0].lexeme, "a");
        assert_eq!(toks[1].kind, TokenKind::LiteralChar);
        assert_eq!(toks[1].lexeme, "");
        assert!(!handler.has_criticals());
    }

    #[test]
    fn test_unterminated_char_is_critical() {
        let (_, handler) = lex("'ab'");
        assert!(handler.has_criticals());
        assert!(handler.diagnostics()[0]
            .message
            .contains("unterminated char literal"));
    }

    #[test]
    fn test_compound_operators() {
        let cases = [
            ("+=", TokenKind::PlusAssign),
            ("-=", TokenKind::MinusAssign),
            ("*=", TokenKind::StarAssign),
            ("/=", TokenKind::SlashAssign),
            ("%=", TokenKind::PercentAssign),
            ("|=", TokenKind::PipeAssign),
            ("^=", TokenKind::HatAssign),
            ("&=", TokenKind::AmpersandAssign),
            ("<<=", TokenKind::ShlAssign),
            (">>=", TokenKind::ShrAssign),
            ("<<", TokenKind::ShiftLeft),
            (">>", TokenKind::ShiftRight),
            ("->", TokenKind::ReturnArrow),
            ("**", TokenKind::DoubleStar),
            ("//", TokenKind::DoubleSlash),
            ("==", TokenKind::DoubleEq),
            ("!=", TokenKind::NotEq),
            ("<=", TokenKind::Le),
            (">=", TokenKind::Ge),
        ];
        for (src, expected) in cases {
            let (stream, _) = lex(src);
            let tok = stream.iter().next().unwrap();
            assert_eq!(tok.kind, expected, "source: {src}");
            assert_eq!(tok.lexeme, src);
        }
    }

    #[test]
    fn test_single_char_operators() {
        assert_eq!(
            kinds("( ) [ ] { } : ; , . ~"),
            vec![
                TokenKind::OpenParen,
                TokenKind::CloseParen,
                TokenKind::OpenBracket,
                TokenKind::CloseBracket,
                TokenKind::OpenCurly,
                TokenKind::CloseCurly,
                TokenKind::Colon,
                TokenKind::SemiColon,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Tilde,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_emit_no_tokens() {
        assert_eq!(kinds("# a comment\n# another"), vec![TokenKind::Eof]);

        let (stream, _) = lex("let # trailing\nx");
        let toks: Vec<_> = stream.iter().collect();
        assert_eq!(toks[0].lexeme, "let");
        assert_eq!(toks[1].lexeme, "x");
        assert_eq!(toks[1].loc, Location::new(1, 0));
    }

    #[test]
    fn test_foreign_bytes_are_reported_as_tokens() {
        let (stream, _) = lex("let ` x");
        let toks: Vec<_> = stream.iter().collect();
        assert_eq!(toks[1].kind, TokenKind::Foreign);
        assert_eq!(toks[1].lexeme, "`");
    }

    #[test]
    fn test_full_declaration() {
        assert_eq!(
            kinds("mut x: int = 5;"),
            vec![
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::LiteralNum,
                TokenKind::SemiColon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_relex_of_lexeme_concatenation_preserves_kinds() {
        let src = "fn int main()\n  mut x: int = 1 + 2 * 3;\n  return x;\nend";
        let (first, _) = lex(src);

        let joined: String = first
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| match t.kind {
                TokenKind::LiteralChar => format!("'{}' ", t.lexeme),
                _ => format!("{} ", t.lexeme),
            })
            .collect();
        let (second, _) = lex(&joined);

        let a: Vec<_> = first.iter().map(|t| t.kind).collect();
        let b: Vec<_> = second.iter().map(|t| t.kind).collect();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_identifiers_lex_as_single_token(name in "[a-z_][a-z0-9_]{0,12}") {
            prop_assume!(crate::token::Keyword::from_lexeme(&name).is_none());
            prop_assume!(name != "true" && name != "false");

            let (stream, handler) = lex(&name);
            let toks: Vec<_> = stream.iter().collect();
            prop_assert_eq!(toks.len(), 2);
            prop_assert_eq!(toks[0].kind, TokenKind::Identifier);
            prop_assert_eq!(toks[0].lexeme.clone(), name);
            prop_assert!(!handler.has_criticals());
        }

        #[test]
        fn prop_integers_round_trip(n in 0u64..=u64::MAX / 2) {
            let src = n.to_string();
            let (stream, _) = lex(&src);
            let toks: Vec<_> = stream.iter().collect();
            prop_assert_eq!(toks[0].kind, TokenKind::LiteralNum);
            prop_assert_eq!(toks[0].lexeme.clone(), src);
        }
    }
}
