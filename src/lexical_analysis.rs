//! Lexer that turns program text into tokens, one token at a time.

use std::fmt::Display;

use lazy_static::lazy_static;
use regex::Regex;

/// The different classes of tokens that compose the language.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum TokenClass {
    Error,
    EndOfInput,
    Number,
    Bool,
    Identifier,
    LeftParen,
    RightParen,
}

/// Display trait implementation for TokenClass, as it appears in parse errors.
impl Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Error => "error",
            Self::EndOfInput => "EOF",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Identifier => "identifier",
            Self::LeftParen => "'('",
            Self::RightParen => "')'",
        };

        return write!(f, "{}", text);
    }
}

/// Represents a single token of the language. For error tokens, `token_text`
/// holds the error message instead of source text.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Token {
    pub token_class: TokenClass,
    pub token_text: String,
}

impl Token {
    fn new(token_class: TokenClass, token_text: &str) -> Token {
        return Token {
            token_class: token_class,
            token_text: String::from(token_text),
        };
    }

    fn error(message: String) -> Token {
        return Token {
            token_class: TokenClass::Error,
            token_text: message,
        };
    }
}

// Represents how to recognize a token class at the start of the remaining
// input.
#[derive(Debug)]
struct TokenRule {
    token_class: TokenClass,
    regex: Regex,
}

// Vector of regex patterns that correspond to each token class that has
// source text. Bools are recognized as identifiers and reclassified later.
lazy_static! {
    static ref TOKEN_RULES: Vec<TokenRule> = vec![
        TokenRule {
            token_class: TokenClass::Number,
            regex: Regex::new(r"^-?[0-9]+").expect("Unable to compile Number rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Identifier,
            regex: Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*")
                .expect("Unable to compile Identifier rule regex."),
        },
        TokenRule {
            token_class: TokenClass::LeftParen,
            regex: Regex::new(r"^\(").expect("Unable to compile LeftParen rule regex."),
        },
        TokenRule {
            token_class: TokenClass::RightParen,
            regex: Regex::new(r"^\)").expect("Unable to compile RightParen rule regex."),
        },
    ];
    static ref WHITESPACE_REGEX: Regex =
        Regex::new(r"^[ \t\r\n]*").expect("Unable to compile whitespace regex.");
    static ref MALFORMED_RUN_REGEX: Regex =
        Regex::new(r"^[^ \t\r\n)]*").expect("Unable to compile malformed run regex.");
}

/// Returns true if `ch` terminates a run of letters or digits. End of input is
/// also a boundary and is handled by the caller.
fn is_boundary(ch: char) -> bool {
    return matches!(ch, ' ' | '\t' | '\r' | '\n' | ')');
}

// Finds the rule that matches at the start of the input string, along with
// the length of the match.
fn get_matching_rule(input_str: &str) -> Option<(&'static TokenRule, usize)> {
    return TOKEN_RULES.iter().find_map(|token_rule| {
        token_rule
            .regex
            .find(input_str)
            .map(|match_obj| (token_rule, match_obj.end()))
    });
}

/// Lexer state over a borrowed program string.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        return Lexer {
            input: input,
            pos: 0,
        };
    }

    // Consumes the longest run of non-boundary characters starting at
    // `start` and returns it.
    fn consume_malformed_run(&mut self, start: usize) -> &'a str {
        let run_len = MALFORMED_RUN_REGEX
            .find(&self.input[start..])
            .map_or(0, |match_obj| match_obj.end());

        self.pos = start + run_len;
        return &self.input[start..self.pos];
    }

    /// Returns the next token. Once the input is exhausted, every call returns
    /// an end-of-input token.
    pub fn next_token(&mut self) -> Token {
        let input: &'a str = self.input;

        if let Some(match_obj) = WHITESPACE_REGEX.find(&input[self.pos..]) {
            self.pos += match_obj.end();
        }

        let start = self.pos;
        let rest = &input[start..];

        let first_char = match rest.chars().next() {
            None => return Token::new(TokenClass::EndOfInput, ""),
            Some(ch) => ch,
        };

        let (token_rule, match_len) = match get_matching_rule(rest) {
            Some(rule_and_len) => rule_and_len,

            // A minus sign that isn't followed by a digit.
            None if first_char == '-' => {
                let run = self.consume_malformed_run(start);
                return Token::error(format!("bad number syntax: '{}'", run));
            }

            None => {
                self.pos += first_char.len_utf8();
                return Token::error(format!("illegal character: '{}'", first_char));
            }
        };

        let text = &rest[..match_len];

        match token_rule.token_class {
            TokenClass::Number | TokenClass::Identifier => {
                let next_is_boundary = rest[match_len..].chars().next().map_or(true, is_boundary);

                if !next_is_boundary {
                    let run = self.consume_malformed_run(start);
                    let kind = match token_rule.token_class {
                        TokenClass::Number => "number",
                        _ => "identifier",
                    };
                    return Token::error(format!("bad {} syntax: '{}'", kind, run));
                }

                self.pos += match_len;

                if token_rule.token_class == TokenClass::Identifier
                    && (text == "true" || text == "false")
                {
                    return Token::new(TokenClass::Bool, text);
                }

                return Token::new(token_rule.token_class, text);
            }

            token_class => {
                self.pos += match_len;
                return Token::new(token_class, text);
            }
        }
    }
}

/// Given a string, returns the tokens that comprise it. The returned vector
/// ends with the first end-of-input or error token.
pub fn run_lexical_analysis(program_str: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(program_str);
    let mut out = Vec::new();

    loop {
        let token = lexer.next_token();
        let is_last = matches!(
            token.token_class,
            TokenClass::EndOfInput | TokenClass::Error
        );

        out.push(token);

        if is_last {
            break;
        }
    }

    return out;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(token_class: TokenClass, token_text: &str) -> Token {
        return Token::new(token_class, token_text);
    }

    fn eof() -> Token {
        return tok(TokenClass::EndOfInput, "");
    }

    fn err(message: &str) -> Token {
        return Token::error(String::from(message));
    }

    // Test if each rule is found for input starting with its token class.
    #[test]
    fn test_get_matching_rule() {
        // Test cases formatted as (input_str, expected_token_class, expected_match_len).
        let cases = vec![
            ("-12 x", TokenClass::Number, 3),
            ("abc1 x", TokenClass::Identifier, 4),
            ("((", TokenClass::LeftParen, 1),
            (")x", TokenClass::RightParen, 1),
        ];

        for (input_str, expected_class, expected_len) in cases {
            let (token_rule, match_len) =
                get_matching_rule(input_str).expect("Expected a matching rule.");
            assert_eq!(token_rule.token_class, expected_class);
            assert_eq!(match_len, expected_len);
        }

        assert!(get_matching_rule("]").is_none());
        assert!(get_matching_rule("-x").is_none());
    }

    // Test if run_lexical_analysis returns the desired token stream for valid
    // input.
    #[test]
    fn test_valid_token_streams() {
        let app = tok(TokenClass::Identifier, "app");
        let lam = tok(TokenClass::Identifier, "lam");
        let x = tok(TokenClass::Identifier, "x");
        let three = tok(TokenClass::Number, "3");

        let cases = vec![
            ("", vec![eof()]),
            (" \t\r\n", vec![eof()]),
            ("3", vec![three.clone(), eof()]),
            ("-5", vec![tok(TokenClass::Number, "-5"), eof()]),
            ("true", vec![tok(TokenClass::Bool, "true"), eof()]),
            ("lam x x", vec![lam.clone(), x.clone(), x.clone(), eof()]),
            (
                "app lam x true false",
                vec![
                    app.clone(),
                    lam.clone(),
                    x.clone(),
                    tok(TokenClass::Bool, "true"),
                    tok(TokenClass::Bool, "false"),
                    eof(),
                ],
            ),
            (
                "   app    lam x   x 3    ",
                vec![
                    app.clone(),
                    lam.clone(),
                    x.clone(),
                    x.clone(),
                    three.clone(),
                    eof(),
                ],
            ),
            (
                "(app gt 3)",
                vec![
                    tok(TokenClass::LeftParen, "("),
                    app.clone(),
                    tok(TokenClass::Identifier, "gt"),
                    three.clone(),
                    tok(TokenClass::RightParen, ")"),
                    eof(),
                ],
            ),
        ];

        for (input_str, expected_tokens) in cases {
            assert_eq!(run_lexical_analysis(input_str), expected_tokens, "{:?}", input_str);
        }
    }

    // Test if malformed input yields a single error covering the whole run.
    // A letter run such as "truex" is an ordinary identifier.
    #[test]
    fn test_error_tokens() {
        let lam = tok(TokenClass::Identifier, "lam");
        let x = tok(TokenClass::Identifier, "x");

        let cases = vec![
            ("-", vec![err("bad number syntax: '-'")]),
            ("-x", vec![err("bad number syntax: '-x'")]),
            ("3/", vec![err("bad number syntax: '3/'")]),
            ("3x", vec![err("bad number syntax: '3x'")]),
            ("12ab3 4", vec![err("bad number syntax: '12ab3'")]),
            ("truex", vec![tok(TokenClass::Identifier, "truex"), eof()]),
            ("true-", vec![err("bad identifier syntax: 'true-'")]),
            (
                "lam x' x",
                vec![lam.clone(), err("bad identifier syntax: 'x''")],
            ),
            (
                "lam x x ]",
                vec![lam.clone(), x.clone(), x.clone(), err("illegal character: ']'")],
            ),
            ("λ", vec![err("illegal character: 'λ'")]),
        ];

        for (input_str, expected_tokens) in cases {
            assert_eq!(run_lexical_analysis(input_str), expected_tokens, "{:?}", input_str);
        }
    }

    // Test if the lexer keeps returning end-of-input once exhausted, and
    // resumes after a malformed run.
    #[test]
    fn test_lexer_state() {
        let mut lexer = Lexer::new("3x)");
        assert_eq!(lexer.next_token(), err("bad number syntax: '3x'"));
        assert_eq!(lexer.next_token(), tok(TokenClass::RightParen, ")"));

        for _ in 0..3 {
            assert_eq!(lexer.next_token(), eof());
        }
    }

    // Test if a number directly followed by a closing paren is valid.
    #[test]
    fn test_boundary_paren() {
        assert_eq!(
            run_lexical_analysis("(-1)"),
            vec![
                tok(TokenClass::LeftParen, "("),
                tok(TokenClass::Number, "-1"),
                tok(TokenClass::RightParen, ")"),
                eof(),
            ]
        );
    }
}
