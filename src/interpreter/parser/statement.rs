use std::rc::Rc;

use crate::{
    ast::{FunctionDecl, Param, Stmt},
    interpreter::{lexer::TokenKind,
                  parser::core::{ParseResult, Parser}},
};

impl Parser<'_> {
    /// Parses a plain statement (any non-declaration form).
    pub(crate) fn statement(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind.clone() {
            TokenKind::If => {
                self.advance();
                self.if_statement()
            },
            TokenKind::While => {
                self.advance();
                self.while_statement()
            },
            TokenKind::For => {
                self.advance();
                self.for_statement()
            },
            TokenKind::Return => {
                self.advance();
                self.return_statement()
            },
            TokenKind::Break => {
                self.advance();
                let line = self.previous().line;
                self.consume(&TokenKind::Semicolon)?;
                Ok(Stmt::Break { line })
            },
            TokenKind::Continue => {
                self.advance();
                let line = self.previous().line;
                self.consume(&TokenKind::Semicolon)?;
                Ok(Stmt::Continue { line })
            },
            TokenKind::Try => {
                self.advance();
                self.try_catch_statement()
            },
            TokenKind::Throw => {
                self.advance();
                self.throw_statement()
            },
            TokenKind::LBrace => self.block_statement(),
            _ => self.expression_statement(),
        }
    }

    /// `loc`/`const` variable declaration; the keyword has been consumed.
    ///
    /// Grammar: `("loc" | "const") IDENT (":" type)? ("=" expression)? ";"`
    pub(crate) fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        let is_const = self.previous().kind == TokenKind::Const;
        let name = self.consume_identifier("variable name")?;

        let annotation = if self.match_kind(&TokenKind::Colon) {
            Some(self.type_annotation()?)
        } else {
            None
        };

        let initializer = if self.match_kind(&TokenKind::Assign) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(&TokenKind::Semicolon)?;
        Ok(Stmt::VarDecl { name,
                           annotation,
                           initializer,
                           is_const,
                           line })
    }

    /// Function declaration; the `func` keyword has been consumed.
    ///
    /// Grammar: `IDENT "(" params? ")" (":" type)? block`
    pub(crate) fn function_declaration(&mut self) -> ParseResult<Stmt> {
        Ok(Stmt::FunctionDecl(self.function_decl()?))
    }

    /// Shared function-declaration body used for both free functions and
    /// class methods.
    pub(crate) fn function_decl(&mut self) -> ParseResult<Rc<FunctionDecl>> {
        let line = self.line();
        let name = self.consume_identifier("function name")?;
        self.consume(&TokenKind::LParen)?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let param_name = self.consume_identifier("parameter name")?;
                let annotation = if self.match_kind(&TokenKind::Colon) {
                    Some(self.type_annotation()?)
                } else {
                    None
                };
                params.push(Param { name: param_name,
                                    annotation });
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RParen)?;

        let return_type = if self.match_kind(&TokenKind::Colon) {
            Some(self.type_annotation()?)
        } else {
            None
        };

        let body = self.block()?;
        Ok(Rc::new(FunctionDecl { name,
                                  params,
                                  return_type,
                                  body,
                                  line }))
    }

    /// Class declaration; the `class` keyword has been consumed.
    ///
    /// Grammar: `IDENT (":" IDENT)? "{" ("func"? method)* "}"`
    pub(crate) fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        let name = self.consume_identifier("class name")?;

        let superclass = if self.match_kind(&TokenKind::Colon) {
            Some(self.consume_identifier("superclass name")?)
        } else {
            None
        };

        self.consume(&TokenKind::LBrace)?;

        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            self.match_kind(&TokenKind::Func);
            methods.push(self.function_decl()?);
        }

        self.consume(&TokenKind::RBrace)?;
        Ok(Stmt::ClassDecl { name,
                             superclass,
                             methods,
                             line })
    }

    /// Import statement; the `import` keyword has been consumed.
    ///
    /// Grammar: `import STRING ;` or
    /// `import "{" IDENT ("," IDENT)* "}" from STRING ("as" IDENT)? ;`
    pub(crate) fn import_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        let mut imports = Vec::new();
        let mut alias = None;

        let module = if self.match_kind(&TokenKind::LBrace) {
            loop {
                imports.push(self.consume_identifier("identifier in import list")?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
            self.consume(&TokenKind::RBrace)?;
            self.consume(&TokenKind::From)?;
            let module = self.consume_string("module name string")?;
            if self.match_kind(&TokenKind::As) {
                alias = Some(self.consume_identifier("alias name")?);
            }
            module
        } else {
            let module = self.consume_string("module name string")?;
            if self.match_kind(&TokenKind::As) {
                alias = Some(self.consume_identifier("alias name")?);
            }
            module
        };

        self.consume(&TokenKind::Semicolon)?;
        Ok(Stmt::Import { module,
                          imports,
                          alias,
                          line })
    }

    /// Export statement; the `export` keyword has been consumed.
    ///
    /// Grammar: `export IDENT ;` or `export "{" IDENT ("," IDENT)* "}" ;`
    pub(crate) fn export_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        let mut names = Vec::new();

        if self.match_kind(&TokenKind::LBrace) {
            loop {
                names.push(self.consume_identifier("identifier in export list")?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
            self.consume(&TokenKind::RBrace)?;
        } else {
            names.push(self.consume_identifier("export name")?);
        }

        self.consume(&TokenKind::Semicolon)?;
        Ok(Stmt::Export { names, line })
    }

    /// Namespace declaration; the `namespace` keyword has been consumed.
    pub(crate) fn namespace_declaration(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        let name = self.consume_identifier("namespace name")?;
        let body = self.block()?;
        Ok(Stmt::Namespace { name, body, line })
    }

    /// `if condition then statement (elif ... | else statement)?`
    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        let condition = self.expression()?;
        self.consume(&TokenKind::Then)?;
        let then_branch = Box::new(self.statement()?);

        let else_branch = if self.match_kind(&TokenKind::Elif) {
            Some(Box::new(self.if_statement()?))
        } else if self.match_kind(&TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If { condition,
                      then_branch,
                      else_branch,
                      line })
    }

    /// `while condition statement`
    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        let condition = self.expression()?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition,
                         body,
                         line })
    }

    /// `for ( IDENT in expression ) statement`
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        self.consume(&TokenKind::LParen)?;
        let variable = self.consume_identifier("loop variable name")?;
        self.consume(&TokenKind::In)?;
        let iterable = self.expression()?;
        self.consume(&TokenKind::RParen)?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::For { variable,
                       iterable,
                       body,
                       line })
    }

    /// `return expression? ;`
    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(&TokenKind::Semicolon)?;
        Ok(Stmt::Return { value, line })
    }

    /// `try block catch ( IDENT (":" type)? ) block`
    fn try_catch_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        let try_block = Box::new(self.block_statement()?);

        self.consume(&TokenKind::Catch)?;
        self.consume(&TokenKind::LParen)?;
        let catch_var = self.consume_identifier("catch variable name")?;
        let catch_type = if self.match_kind(&TokenKind::Colon) {
            Some(self.type_annotation()?)
        } else {
            None
        };
        self.consume(&TokenKind::RParen)?;

        let catch_block = Box::new(self.block_statement()?);
        Ok(Stmt::TryCatch { try_block,
                            catch_var,
                            catch_type,
                            catch_block,
                            line })
    }

    /// `throw expression ;`
    fn throw_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        let expr = self.expression()?;
        self.consume(&TokenKind::Semicolon)?;
        Ok(Stmt::Throw { expr, line })
    }

    /// `{ declaration* }` as a statement.
    pub(crate) fn block_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        let statements = self.block()?;
        Ok(Stmt::Block { statements, line })
    }

    /// `{ declaration* }` as a raw statement list.
    pub(crate) fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.consume(&TokenKind::LBrace)?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if let Some(statement) = self.declaration()? {
                statements.push(statement);
            }
        }

        self.consume(&TokenKind::RBrace)?;
        Ok(statements)
    }

    /// `expression ;`
    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        let expr = self.expression()?;
        self.consume(&TokenKind::Semicolon)?;
        Ok(Stmt::Expression { expr, line })
    }
}
