//! Linker-provided builtins.
//!
//! Builtins are declared in the language's own signature syntax and parsed
//! with the compiler's own lexer and parser, so the table can never drift
//! from what the front-end accepts.

use wombatc_lex::lex_text;
use wombatc_par::ast::FnHeader;
use wombatc_par::Parser;
use wombatc_util::Handler;

use crate::analysis::SemaError;

/// One builtin: external symbol name plus its Wombat signature.
#[derive(Clone, Copy, Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub signature: &'static str,
}

/// The fixed builtin table, linked externally into every executable.
pub const BUILTINS: [Builtin; 4] = [
    Builtin {
        name: "putchar",
        signature: "fn free putchar(_1: char);",
    },
    Builtin {
        name: "putnum",
        signature: "fn free putnum(_1: int);",
    },
    Builtin {
        name: "quit",
        signature: "fn free quit(_1: int);",
    },
    Builtin {
        name: "assert",
        signature: "fn free assert(_1: bool);",
    },
];

/// Parses every builtin signature into a function header.
///
/// A failure here means the table itself is malformed, which is a compiler
/// bug rather than a user error.
pub fn builtin_headers() -> Result<Vec<FnHeader>, SemaError> {
    BUILTINS
        .iter()
        .map(|builtin| {
            let handler = Handler::new();
            let (stream, _) = lex_text("<builtins>", builtin.signature, &handler);
            if handler.has_criticals() {
                return Err(SemaError::internal(format!(
                    "builtin signature for '{}' does not lex",
                    builtin.name
                )));
            }
            Parser::new(stream).parse_fn_signature().map_err(|err| {
                SemaError::internal(format!(
                    "builtin signature for '{}' does not parse: {err}",
                    builtin.name
                ))
            })
        })
        .collect()
}
