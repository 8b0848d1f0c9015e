use crate::{
    ast::{TypeAnnotation, TypeKind},
    error::ParseError,
    interpreter::{lexer::TokenKind,
                  parser::core::{ParseResult, Parser}},
};

impl Parser<'_> {
    /// Parses a type annotation.
    ///
    /// Grammar:
    /// ```text
    /// type      := member ("|" member)*
    /// member    := "int" | "float" | "bool" | "string" | "..."
    ///            | "array" "[" type "]"
    ///            | "dict" "{" type ":" type "}"
    /// ```
    ///
    /// Dictionary key types must include one of the basic kinds; in
    /// practice keys are strings at the value layer.
    pub(crate) fn type_annotation(&mut self) -> ParseResult<TypeAnnotation> {
        let line = self.line();
        let mut annotation = TypeAnnotation::default();
        let mut has_types = false;

        loop {
            match self.peek().kind.clone() {
                TokenKind::TypeInt => {
                    self.advance();
                    annotation.kinds.push(TypeKind::Int);
                    has_types = true;
                },
                TokenKind::TypeFloat => {
                    self.advance();
                    annotation.kinds.push(TypeKind::Float);
                    has_types = true;
                },
                TokenKind::TypeBool => {
                    self.advance();
                    annotation.kinds.push(TypeKind::Bool);
                    has_types = true;
                },
                TokenKind::TypeString => {
                    self.advance();
                    annotation.kinds.push(TypeKind::Str);
                    has_types = true;
                },
                TokenKind::Ellipsis => {
                    self.advance();
                    annotation.kinds.push(TypeKind::Any);
                    has_types = true;
                },
                TokenKind::TypeArray => {
                    if annotation.is_array || annotation.is_dict {
                        return Err(ParseError::InvalidSyntax { details: "type cannot be both \
                                                                         array and dict"
                                                                                  .to_string(),
                                                               line });
                    }
                    self.advance();
                    annotation.is_array = true;
                    self.consume(&TokenKind::LBracket)?;
                    annotation.element = Some(Box::new(self.type_annotation()?));
                    self.consume(&TokenKind::RBracket)?;
                    has_types = true;
                },
                TokenKind::TypeDict => {
                    if annotation.is_array || annotation.is_dict {
                        return Err(ParseError::InvalidSyntax { details: "type cannot be both \
                                                                         array and dict"
                                                                                  .to_string(),
                                                               line });
                    }
                    self.advance();
                    annotation.is_dict = true;
                    self.consume(&TokenKind::LBrace)?;
                    annotation.key = Some(Box::new(self.type_annotation()?));
                    self.consume(&TokenKind::Colon)?;
                    annotation.element = Some(Box::new(self.type_annotation()?));
                    self.consume(&TokenKind::RBrace)?;
                    has_types = true;
                },
                _ => break,
            }

            if !self.match_kind(&TokenKind::BitOr) {
                break;
            }
        }

        if !has_types {
            return Err(ParseError::UnexpectedToken { token: format!("expected type annotation, \
                                                                     found '{}'",
                                                                    self.peek().kind),
                                                     line });
        }

        if annotation.is_dict
           && let Some(key) = &annotation.key
           && !key.kinds.is_empty()
           && !key.kinds.iter().any(|kind| {
                                  matches!(kind,
                                           TypeKind::Str
                                           | TypeKind::Int
                                           | TypeKind::Float
                                           | TypeKind::Bool)
                              })
        {
            return Err(ParseError::InvalidSyntax { details: "dictionary key must be a basic \
                                                             type (string, int, float, bool)"
                                                                      .to_string(),
                                                   line });
        }

        Ok(annotation)
    }
}
