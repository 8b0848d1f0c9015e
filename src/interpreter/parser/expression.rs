use crate::{
    ast::{AssignOp, BinaryOp, Expr, LiteralValue, UnaryOp},
    error::ParseError,
    interpreter::{lexer::TokenKind,
                  parser::core::{ParseResult, Parser}},
};

impl Parser<'_> {
    /// Parses a full expression.
    ///
    /// Grammar: `expression := assignment`
    pub(crate) fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    /// Right-associative assignment, plain or compound.
    ///
    /// The left-hand side is validated here: only identifier, member and
    /// index expressions may be assigned to. Compound operators are kept
    /// verbatim for the evaluator to desugar.
    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.ternary()?;

        if let Some(op) = self.match_assign_op() {
            let line = self.previous().line;
            let value = self.assignment()?;

            return match expr {
                Expr::Identifier { .. } | Expr::Member { .. } | Expr::Index { .. } => {
                    Ok(Expr::Assign { target: Box::new(expr),
                                      op,
                                      value: Box::new(value),
                                      line })
                },
                _ => Err(ParseError::InvalidAssignmentTarget { line }),
            };
        }

        Ok(expr)
    }

    /// Consumes an assignment operator token, if one is next.
    fn match_assign_op(&mut self) -> Option<AssignOp> {
        let op = match self.peek().kind {
            TokenKind::Assign => AssignOp::Assign,
            TokenKind::PlusAssign => AssignOp::Add,
            TokenKind::MinusAssign => AssignOp::Sub,
            TokenKind::StarAssign => AssignOp::Mul,
            TokenKind::SlashAssign => AssignOp::Div,
            TokenKind::PercentAssign => AssignOp::Mod,
            TokenKind::BitAndAssign => AssignOp::BitAnd,
            TokenKind::BitOrAssign => AssignOp::BitOr,
            TokenKind::BitXorAssign => AssignOp::BitXor,
            TokenKind::ShlAssign => AssignOp::Shl,
            TokenKind::ShrAssign => AssignOp::Shr,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    /// `condition ? then : else`, right-associative in the else position.
    fn ternary(&mut self) -> ParseResult<Expr> {
        let expr = self.logical_or()?;

        if self.match_kind(&TokenKind::Question) {
            let line = self.previous().line;
            let then_expr = self.expression()?;
            self.consume(&TokenKind::Colon)
                .map_err(|_| ParseError::UnexpectedToken { token: "expected ':' in ternary \
                                                                   expression"
                                                                            .to_string(),
                                                           line })?;
            let else_expr = self.ternary()?;
            return Ok(Expr::Conditional { condition: Box::new(expr),
                                          then_expr: Box::new(then_expr),
                                          else_expr: Box::new(else_expr),
                                          line });
        }

        Ok(expr)
    }

    /// Left-associative binary helper: parses `next (op next)*` for the
    /// operators `table` maps from the current token kind.
    fn binary_level(&mut self,
                    next: fn(&mut Self) -> ParseResult<Expr>,
                    table: fn(&TokenKind) -> Option<BinaryOp>)
                    -> ParseResult<Expr> {
        let mut expr = next(self)?;

        while let Some(op) = table(&self.peek().kind) {
            let line = self.line();
            self.advance();
            let right = next(self)?;
            expr = Expr::Binary { left: Box::new(expr),
                                  op,
                                  right: Box::new(right),
                                  line };
        }

        Ok(expr)
    }

    /// `logical_or := logical_and ("||" logical_and)*`
    fn logical_or(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::logical_and, |kind| match kind {
            TokenKind::Or => Some(BinaryOp::Or),
            _ => None,
        })
    }

    /// `logical_and := bit_or ("&&" bit_or)*`
    fn logical_and(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::bit_or, |kind| match kind {
            TokenKind::And => Some(BinaryOp::And),
            _ => None,
        })
    }

    /// `bit_or := bit_xor ("|" bit_xor)*`
    fn bit_or(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::bit_xor, |kind| match kind {
            TokenKind::BitOr => Some(BinaryOp::BitOr),
            _ => None,
        })
    }

    /// `bit_xor := bit_and ("^" bit_and)*`
    fn bit_xor(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::bit_and, |kind| match kind {
            TokenKind::BitXor => Some(BinaryOp::BitXor),
            _ => None,
        })
    }

    /// `bit_and := equality ("&" equality)*`
    fn bit_and(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::equality, |kind| match kind {
            TokenKind::BitAnd => Some(BinaryOp::BitAnd),
            _ => None,
        })
    }

    /// `equality := comparison (("==" | "!=") comparison)*`
    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::comparison, |kind| match kind {
            TokenKind::Equal => Some(BinaryOp::Equal),
            TokenKind::NotEqual => Some(BinaryOp::NotEqual),
            _ => None,
        })
    }

    /// `comparison := shift (("<" | "<=" | ">" | ">=") shift)*`
    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::shift, |kind| match kind {
            TokenKind::Less => Some(BinaryOp::Less),
            TokenKind::LessEqual => Some(BinaryOp::LessEqual),
            TokenKind::Greater => Some(BinaryOp::Greater),
            TokenKind::GreaterEqual => Some(BinaryOp::GreaterEqual),
            _ => None,
        })
    }

    /// `shift := additive (("<<" | ">>") additive)*`
    fn shift(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::additive, |kind| match kind {
            TokenKind::Shl => Some(BinaryOp::Shl),
            TokenKind::Shr => Some(BinaryOp::Shr),
            _ => None,
        })
    }

    /// `additive := multiplicative (("+" | "-") multiplicative)*`
    fn additive(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::multiplicative, |kind| match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    /// `multiplicative := unary (("*" | "/" | "%") unary)*`
    fn multiplicative(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::unary, |kind| match kind {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    /// Prefix unary operators, right-recursive.
    fn unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Negate),
            TokenKind::BitNot => Some(UnaryOp::BitNot),
            TokenKind::Increment => Some(UnaryOp::Increment),
            TokenKind::Decrement => Some(UnaryOp::Decrement),
            TokenKind::Await => Some(UnaryOp::Await),
            _ => None,
        };

        if let Some(op) = op {
            let line = self.line();
            self.advance();
            let operand = self.unary()?;
            return Ok(Expr::Unary { op,
                                    operand: Box::new(operand),
                                    line });
        }

        self.postfix()
    }

    /// Postfix chain on a primary: calls, member access, indexing and
    /// slicing, followed by optional `as T` casts.
    fn postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.match_kind(&TokenKind::LParen) {
                expr = self.finish_call(expr)?;
            } else if self.match_kind(&TokenKind::Dot) {
                let line = self.previous().line;
                let property = self.consume_identifier("property name after '.'")?;
                expr = Expr::Member { object: Box::new(expr),
                                      property,
                                      line };
            } else if self.match_kind(&TokenKind::LBracket) {
                expr = self.finish_index_or_slice(expr)?;
            } else {
                break;
            }
        }

        while self.match_kind(&TokenKind::As) {
            let line = self.previous().line;
            let annotation = self.type_annotation()?;
            expr = Expr::Cast { expr: Box::new(expr),
                                annotation,
                                line };
        }

        Ok(expr)
    }

    /// Argument list after `(` has been consumed.
    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let line = self.previous().line;
        let mut arguments = Vec::new();

        if !self.check(&TokenKind::RParen) {
            loop {
                arguments.push(self.expression()?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RParen)?;

        Ok(Expr::Call { callee: Box::new(callee),
                        arguments,
                        line })
    }

    /// Index or slice after `[` has been consumed. The slice form is
    /// recognised by a `:` before the closing `]`; missing bounds stay
    /// open.
    fn finish_index_or_slice(&mut self, object: Expr) -> ParseResult<Expr> {
        let line = self.previous().line;

        let start = if self.check(&TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.expression()?))
        };

        if self.match_kind(&TokenKind::Colon) {
            let stop = if self.check(&TokenKind::Colon) || self.check(&TokenKind::RBracket) {
                None
            } else {
                Some(Box::new(self.expression()?))
            };

            let step = if self.match_kind(&TokenKind::Colon) && !self.check(&TokenKind::RBracket) {
                Some(Box::new(self.expression()?))
            } else {
                None
            };

            self.consume(&TokenKind::RBracket)?;
            return Ok(Expr::Slice { object: Box::new(object),
                                    start,
                                    stop,
                                    step,
                                    line });
        }

        self.consume(&TokenKind::RBracket)?;
        let index = start.ok_or(ParseError::UnexpectedToken { token: "expected index \
                                                                      expression"
                                                                               .to_string(),
                                                              line })?;
        Ok(Expr::Index { object: Box::new(object),
                         index,
                         line })
    }

    /// Primary expressions: literals, identifiers, grouping, array and
    /// dictionary literals.
    fn primary(&mut self) -> ParseResult<Expr> {
        let line = self.line();

        match self.peek().kind.clone() {
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal { value: LiteralValue::Bool(true),
                                   line })
            },
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal { value: LiteralValue::Bool(false),
                                   line })
            },
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Literal { value: LiteralValue::Null,
                                   line })
            },
            TokenKind::Int(value) => {
                self.advance();
                Ok(Expr::Literal { value: LiteralValue::Int(value),
                                   line })
            },
            TokenKind::Float(value) => {
                self.advance();
                Ok(Expr::Literal { value: LiteralValue::Float(value),
                                   line })
            },
            TokenKind::Str(value) => {
                self.advance();
                Ok(Expr::Literal { value: LiteralValue::Str(value),
                                   line })
            },
            TokenKind::This => {
                self.advance();
                Ok(Expr::Identifier { name: "this".to_string(),
                                      line })
            },
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::Identifier { name, line })
            },
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(&TokenKind::RParen)?;
                Ok(expr)
            },
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(&TokenKind::RBracket) {
                    loop {
                        elements.push(self.expression()?);
                        if !self.match_kind(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.consume(&TokenKind::RBracket)?;
                Ok(Expr::Array { elements, line })
            },
            TokenKind::LBrace => {
                self.advance();
                let mut entries = Vec::new();
                if !self.check(&TokenKind::RBrace) {
                    loop {
                        let key = self.expression()?;
                        self.consume(&TokenKind::Colon)?;
                        let value = self.expression()?;
                        entries.push((key, value));
                        if !self.match_kind(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.consume(&TokenKind::RBrace)?;
                Ok(Expr::Dict { entries, line })
            },
            other => Err(ParseError::UnexpectedToken { token: format!("'{other}'"),
                                                       line }),
        }
    }
}
