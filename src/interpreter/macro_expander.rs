use std::collections::HashMap;

use crate::{
    error::ParseError,
    interpreter::lexer::{Token, TokenKind},
};

/// A recorded macro definition.
///
/// Function-like macros carry a parameter list; object-like macros have none
/// and substitute their body verbatim.
#[derive(Debug, Clone)]
struct MacroDef {
    /// Parameter names, in declaration order.
    parameters:       Vec<String>,
    /// The body tokens, everything between the name (or parameter list) and
    /// the terminating `;`.
    body:             Vec<Token>,
    /// Whether the definition had a parenthesised parameter list.
    is_function_like: bool,
}

/// Expands macros over a token vector.
///
/// The table consumes `macro NAME (p1, p2) body ;` definitions, removes them
/// from the stream, and replaces later invocations of `NAME` with the body,
/// substituting parameter identifiers by the invocation's argument token
/// runs.
///
/// Expansion is one-pass: tokens produced by an expansion are not rescanned,
/// so a macro body that names another macro stays unexpanded. This keeps
/// termination trivially deterministic.
///
/// # Example
/// ```
/// use zelo::interpreter::{lexer::tokenize, macro_expander::MacroTable};
///
/// let tokens = tokenize("macro SQR(x) (x) * (x) ; SQR(3);");
/// let expanded = MacroTable::new().process(tokens).unwrap();
///
/// // The definition is gone and the invocation is rewritten.
/// let text: Vec<String> = expanded.iter().map(|t| t.kind.to_string()).collect();
/// assert_eq!(text.join(" "), "( 3 ) * ( 3 ) ; end of file");
/// ```
#[derive(Debug, Default)]
pub struct MacroTable {
    macros: HashMap<String, MacroDef>,
}

impl MacroTable {
    /// Creates an empty macro table.
    #[must_use]
    pub fn new() -> Self {
        Self { macros: HashMap::new(), }
    }

    /// Returns `true` when `name` has been defined as a macro.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Rewrites the token vector: definitions are recorded and removed,
    /// invocations are expanded in place.
    ///
    /// # Errors
    /// Returns a `ParseError` when a definition is malformed or a
    /// function-like macro is invoked with the wrong number of arguments.
    pub fn process(&mut self, tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
        let mut result = Vec::with_capacity(tokens.len());
        let mut i = 0;

        while i < tokens.len() {
            match &tokens[i].kind {
                TokenKind::Macro => {
                    self.collect_definition(&tokens, &mut i)?;
                },
                TokenKind::Identifier(name) if self.is_defined(name) => {
                    let expanded = self.expand_invocation(&tokens, &mut i)?;
                    result.extend(expanded);
                },
                _ => {
                    result.push(tokens[i].clone());
                    i += 1;
                },
            }
        }

        Ok(result)
    }

    /// Records a definition starting at the `macro` keyword and advances the
    /// index past the terminating `;`.
    fn collect_definition(&mut self, tokens: &[Token], i: &mut usize) -> Result<(), ParseError> {
        let line = tokens[*i].line;
        *i += 1;

        let name = match tokens.get(*i).map(|t| &t.kind) {
            Some(TokenKind::Identifier(name)) => name.clone(),
            _ => {
                return Err(ParseError::MacroExpansionError { details:
                                                                 "expected macro name after \
                                                                  'macro'".to_string(),
                                                             line });
            },
        };
        *i += 1;

        let mut parameters = Vec::new();
        let mut is_function_like = false;

        if let Some(TokenKind::LParen) = tokens.get(*i).map(|t| &t.kind) {
            is_function_like = true;
            *i += 1;

            loop {
                match tokens.get(*i).map(|t| &t.kind) {
                    Some(TokenKind::RParen) => break,
                    Some(TokenKind::Identifier(param)) => parameters.push(param.clone()),
                    Some(TokenKind::Comma) => {},
                    _ => {
                        return Err(ParseError::MacroExpansionError {
                            details: format!("bad parameter list for macro '{name}'"),
                            line,
                        });
                    },
                }
                *i += 1;
            }
            *i += 1; // ')'
        }

        let mut body = Vec::new();
        while *i < tokens.len()
              && !matches!(tokens[*i].kind, TokenKind::Semicolon | TokenKind::EndOfFile)
        {
            body.push(tokens[*i].clone());
            *i += 1;
        }

        match tokens.get(*i).map(|t| &t.kind) {
            Some(TokenKind::Semicolon) => *i += 1,
            _ => {
                return Err(ParseError::MacroExpansionError { details:
                                                                 format!("macro '{name}' is \
                                                                          missing its \
                                                                          terminating ';'"),
                                                             line });
            },
        }

        self.macros.insert(name,
                           MacroDef { parameters,
                                      body,
                                      is_function_like });
        Ok(())
    }

    /// Expands an invocation starting at the macro's name token and advances
    /// the index past the whole invocation.
    fn expand_invocation(&self, tokens: &[Token], i: &mut usize) -> Result<Vec<Token>, ParseError> {
        let (name, line) = match &tokens[*i].kind {
            TokenKind::Identifier(name) => (name.clone(), tokens[*i].line),
            _ => unreachable!("caller checked for an identifier"),
        };
        *i += 1;

        let mut arguments = Vec::new();
        if let Some(TokenKind::LParen) = tokens.get(*i).map(|t| &t.kind) {
            *i += 1;
            arguments = parse_arguments(tokens, i);

            match tokens.get(*i).map(|t| &t.kind) {
                Some(TokenKind::RParen) => *i += 1,
                _ => {
                    return Err(ParseError::MacroExpansionError { details:
                                                                     format!("expected ')' after \
                                                                              arguments of macro \
                                                                              '{name}'"),
                                                                 line });
                },
            }
        }

        let def = &self.macros[&name];
        if def.is_function_like && def.parameters.len() != arguments.len() {
            return Err(ParseError::MacroArgumentMismatch { name,
                                                           expected: def.parameters.len(),
                                                           found: arguments.len(),
                                                           line });
        }

        Ok(substitute(&def.body, &def.parameters, &arguments))
    }
}

/// Splits invocation arguments on top-level commas.
///
/// Commas nested inside `(`, `{` or `[` do not split; the scan stops at the
/// `)` matching the invocation's opening parenthesis, leaving the index on
/// it.
fn parse_arguments(tokens: &[Token], i: &mut usize) -> Vec<Vec<Token>> {
    let mut arguments = Vec::new();
    let mut current = Vec::new();
    let mut paren_level = 0i32;
    let mut brace_level = 0i32;
    let mut bracket_level = 0i32;

    while *i < tokens.len() {
        match tokens[*i].kind {
            TokenKind::LParen => paren_level += 1,
            TokenKind::RParen => {
                if paren_level == 0 {
                    break;
                }
                paren_level -= 1;
            },
            TokenKind::LBrace => brace_level += 1,
            TokenKind::RBrace => brace_level -= 1,
            TokenKind::LBracket => bracket_level += 1,
            TokenKind::RBracket => bracket_level -= 1,
            TokenKind::Comma if paren_level == 0 && brace_level == 0 && bracket_level == 0 => {
                if !current.is_empty() {
                    arguments.push(std::mem::take(&mut current));
                }
                *i += 1;
                continue;
            },
            TokenKind::EndOfFile => break,
            _ => {},
        }

        current.push(tokens[*i].clone());
        *i += 1;
    }

    if !current.is_empty() {
        arguments.push(current);
    }

    arguments
}

/// Substitutes parameter identifiers in a macro body by the corresponding
/// argument token runs. Inserted tokens are spliced in place without
/// re-parenthesisation.
fn substitute(body: &[Token], parameters: &[String], arguments: &[Vec<Token>]) -> Vec<Token> {
    let mut result = Vec::with_capacity(body.len());

    for token in body {
        if let TokenKind::Identifier(name) = &token.kind
           && let Some(index) = parameters.iter().position(|p| p == name)
           && index < arguments.len()
        {
            result.extend(arguments[index].iter().cloned());
            continue;
        }
        result.push(token.clone());
    }

    result
}
