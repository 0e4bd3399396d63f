//! Parser for mini-C
//!
//! A recursive descent parser that converts tokens into an AST. The
//! parser handles precedence and associativity correctly and stops at
//! the first error; there is no recovery.
//!
//! One token of lookahead past the current token is enough for the only
//! ambiguity in the grammar: at an identifier, the token after it decides
//! between an assignment (`=`) and a plain expression.

use crate::ast::*;
use crate::lexer::Lexer;
use crate::span::Position;
use crate::token::{Token, TokenKind};
use crate::ty::Ty;
use thiserror::Error;

/// Parser errors
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("{pos}: unexpected token: expected {expected}, found '{found}'")]
    UnexpectedToken {
        expected: String,
        found: String,
        pos: Position,
    },

    #[error("{pos}: integer literal '{lexeme}' is out of range")]
    IntOutOfRange { lexeme: String, pos: Position },

    #[error("{pos}: {message}")]
    Custom { message: String, pos: Position },
}

impl ParseError {
    pub fn pos(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { pos, .. } => *pos,
            ParseError::IntOutOfRange { pos, .. } => *pos,
            ParseError::Custom { pos, .. } => *pos,
        }
    }
}

/// Parse result
pub type ParseResult<T> = Result<T, ParseError>;

/// The parser for mini-C
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    previous: Token,
    /// Lookahead buffer for multi-token lookahead
    lookahead: Vec<Token>,
}

impl<'src> Parser<'src> {
    /// Create a new parser
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let previous = current.clone();

        Self {
            lexer,
            current,
            previous,
            lookahead: Vec::new(),
        }
    }

    /// Get the source code
    pub fn source(&self) -> &'src str {
        self.lexer.source()
    }

    /// Advance to next token
    fn advance(&mut self) -> Token {
        self.previous = self.current.clone();
        self.current = if !self.lookahead.is_empty() {
            self.lookahead.remove(0)
        } else {
            self.lexer.next_token()
        };
        self.previous.clone()
    }

    /// Peek at the nth token ahead (0 = current, 1 = next, etc.)
    ///
    /// Buffered tokens are handed back by `advance` in order, so peeking
    /// never loses input.
    fn peek_nth(&mut self, n: usize) -> &Token {
        if n == 0 {
            return &self.current;
        }
        while self.lookahead.len() < n {
            let token = self.lexer.next_token();
            self.lookahead.push(token);
        }
        &self.lookahead[n - 1]
    }

    /// Check if current token matches
    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Check if at end of file
    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consume token if it matches, otherwise error
    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("{}", kind)))
        }
    }

    /// Consume token if it matches
    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current.text(self.source()).to_string(),
            pos: self.current.pos,
        }
    }

    // ============ Grammar ============

    /// program ::= extern_list decl_list
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut externs = Vec::new();
        while self.check(TokenKind::Extern) {
            externs.push(self.parse_extern()?);
        }

        let mut decls = Vec::new();
        while !self.is_at_end() {
            decls.push(self.parse_decl()?);
        }

        Ok(Program { externs, decls })
    }

    /// extern ::= "extern" type_spec IDENT "(" params ")" ";"
    fn parse_extern(&mut self) -> ParseResult<ExternDecl> {
        self.expect(TokenKind::Extern)?;
        let ret = self.parse_type_spec()?;
        let token = self.expect(TokenKind::Ident)?;
        let name = token.text(self.source()).to_string();
        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(ExternDecl {
            ret,
            name,
            params,
            token,
        })
    }

    /// decl ::= var_decl | fun_decl
    ///
    /// Both start with a type and a name; the following token decides:
    /// `;` means a global variable, `(` means a function. A `void`
    /// return type can only start a function.
    fn parse_decl(&mut self) -> ParseResult<Decl> {
        let ret = self.parse_type_spec()?;
        let token = self.expect(TokenKind::Ident)?;
        let name = token.text(self.source()).to_string();

        if self.check(TokenKind::Semicolon) && ret != Ty::Void {
            self.advance();
            return Ok(Decl::Var(VarDecl {
                ty: ret,
                name,
                token,
            }));
        }

        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Decl::Function(FnDecl {
            ret,
            name,
            params,
            body,
            token,
        }))
    }

    /// type_spec ::= "int" | "float" | "bool" | "void"
    fn parse_type_spec(&mut self) -> ParseResult<Ty> {
        let ty = match self.current.kind {
            TokenKind::Int => Ty::Int,
            TokenKind::Float => Ty::Float,
            TokenKind::Bool => Ty::Bool,
            TokenKind::Void => Ty::Void,
            _ => return Err(self.unexpected("type specifier")),
        };
        self.advance();
        Ok(ty)
    }

    /// var_type ::= "int" | "float" | "bool"
    fn parse_var_type(&mut self) -> ParseResult<Ty> {
        let ty = match self.current.kind {
            TokenKind::Int => Ty::Int,
            TokenKind::Float => Ty::Float,
            TokenKind::Bool => Ty::Bool,
            _ => return Err(self.unexpected("variable type")),
        };
        self.advance();
        Ok(ty)
    }

    /// params ::= param_list | "void" | ε
    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        if self.check(TokenKind::RParen) {
            return Ok(Vec::new());
        }
        if self.consume(TokenKind::Void) {
            return Ok(Vec::new());
        }

        let mut params = Vec::new();
        loop {
            let ty = self.parse_var_type()?;
            let token = self.expect(TokenKind::Ident)?;
            let name = token.text(self.source()).to_string();
            params.push(Param { ty, name, token });
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    /// block ::= "{" local_decls stmt_list "}"
    ///
    /// All local declarations must precede the statements.
    fn parse_block(&mut self) -> ParseResult<Block> {
        let token = self.expect(TokenKind::LBrace)?;

        let mut decls = Vec::new();
        while self.current.kind.is_var_type() {
            let ty = self.parse_var_type()?;
            let name_token = self.expect(TokenKind::Ident)?;
            let name = name_token.text(self.source()).to_string();
            self.expect(TokenKind::Semicolon)?;
            decls.push(VarDecl {
                ty,
                name,
                token: name_token,
            });
        }

        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            if let Some(stmt) = self.parse_stmt()? {
                stmts.push(stmt);
            }
        }
        self.expect(TokenKind::RBrace)?;

        Ok(Block {
            decls,
            stmts,
            token,
        })
    }

    /// stmt ::= expr_stmt | block | if_stmt | while_stmt | return_stmt
    ///
    /// A bare `;` is an empty statement and produces nothing.
    fn parse_stmt(&mut self) -> ParseResult<Option<Stmt>> {
        match self.current.kind {
            TokenKind::Semicolon => {
                self.advance();
                Ok(None)
            }
            TokenKind::LBrace => Ok(Some(Stmt::Block(self.parse_block()?))),
            TokenKind::If => Ok(Some(self.parse_if()?)),
            TokenKind::While => Ok(Some(self.parse_while()?)),
            TokenKind::Return => Ok(Some(self.parse_return()?)),
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Some(Stmt::Expr(expr)))
            }
        }
    }

    /// if_stmt ::= "if" "(" expr ")" block ("else" block)?
    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let token = self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let then_block = self.parse_block()?;
        let else_block = if self.consume(TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            cond,
            then_block,
            else_block,
            token,
        }))
    }

    /// while_stmt ::= "while" "(" expr ")" stmt
    ///
    /// Unlike `if`, the loop body is any single statement.
    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let token = self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let body = match self.parse_stmt()? {
            Some(stmt) => stmt,
            None => Stmt::Block(Block {
                decls: Vec::new(),
                stmts: Vec::new(),
                token: self.previous.clone(),
            }),
        };
        Ok(Stmt::While(WhileStmt {
            cond,
            body: Box::new(body),
            token,
        }))
    }

    /// return_stmt ::= "return" ";" | "return" expr ";"
    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let token = self.expect(TokenKind::Return)?;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Return(ReturnStmt { value, token }))
    }

    // ============ Expressions ============

    /// expr ::= IDENT "=" expr | or_expr
    ///
    /// An identifier followed by `=` starts an assignment; anything
    /// else falls through to the precedence ladder. One peeked token
    /// settles it without consuming anything.
    fn parse_expr(&mut self) -> ParseResult<Expr> {
        if self.check(TokenKind::Ident) && self.peek_nth(1).kind == TokenKind::Eq {
            let token = self.advance();
            let name = token.text(self.source()).to_string();
            self.advance(); // '='
            let value = self.parse_expr()?;
            return Ok(Expr {
                kind: ExprKind::Assign {
                    name,
                    value: Box::new(value),
                },
                token,
            });
        }
        self.parse_or()
    }

    /// or_expr ::= and_expr ("||" and_expr)*
    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.check(TokenKind::OrOr) {
            let token = self.advance();
            let rhs = self.parse_and()?;
            lhs = binary(BinOp::Or, lhs, rhs, token);
        }
        Ok(lhs)
    }

    /// and_expr ::= eq_expr ("&&" eq_expr)*
    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_equality()?;
        while self.check(TokenKind::AndAnd) {
            let token = self.advance();
            let rhs = self.parse_equality()?;
            lhs = binary(BinOp::And, lhs, rhs, token);
        }
        Ok(lhs)
    }

    /// eq_expr ::= rel_expr (("==" | "!=") rel_expr)*
    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.current.kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                _ => break,
            };
            let token = self.advance();
            let rhs = self.parse_relational()?;
            lhs = binary(op, lhs, rhs, token);
        }
        Ok(lhs)
    }

    /// rel_expr ::= add_expr (("<" | "<=" | ">" | ">=") add_expr)*
    fn parse_relational(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::Ge,
                _ => break,
            };
            let token = self.advance();
            let rhs = self.parse_additive()?;
            lhs = binary(op, lhs, rhs, token);
        }
        Ok(lhs)
    }

    /// add_expr ::= mul_expr (("+" | "-") mul_expr)*
    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let token = self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = binary(op, lhs, rhs, token);
        }
        Ok(lhs)
    }

    /// mul_expr ::= unary_expr (("*" | "/" | "%") unary_expr)*
    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => break,
            };
            let token = self.advance();
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs, token);
        }
        Ok(lhs)
    }

    /// unary_expr ::= ("-" | "!") unary_expr | primary
    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.current.kind {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Not => UnOp::Not,
            _ => return self.parse_primary(),
        };
        let token = self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            token,
        })
    }

    /// primary ::= literal | IDENT | IDENT "(" args ")" | "(" expr ")"
    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.current.kind {
            TokenKind::IntLit => {
                let token = self.advance();
                let lexeme = token.text(self.source());
                let value =
                    lexeme
                        .parse::<i64>()
                        .map_err(|_| ParseError::IntOutOfRange {
                            lexeme: lexeme.to_string(),
                            pos: token.pos,
                        })?;
                Ok(Expr {
                    kind: ExprKind::IntLit(value),
                    token,
                })
            }
            TokenKind::FloatLit => {
                let token = self.advance();
                let lexeme = token.text(self.source());
                let value = lexeme.parse::<f64>().map_err(|_| ParseError::Custom {
                    message: format!("malformed float literal '{}'", lexeme),
                    pos: token.pos,
                })?;
                Ok(Expr {
                    kind: ExprKind::FloatLit(value),
                    token,
                })
            }
            TokenKind::True | TokenKind::False => {
                let token = self.advance();
                Ok(Expr {
                    kind: ExprKind::BoolLit(token.kind == TokenKind::True),
                    token,
                })
            }
            TokenKind::Ident => {
                let token = self.advance();
                let name = token.text(self.source()).to_string();
                if self.consume(TokenKind::LParen) {
                    let args = self.parse_args()?;
                    self.expect(TokenKind::RParen)?;
                    Ok(Expr {
                        kind: ExprKind::Call { callee: name, args },
                        token,
                    })
                } else {
                    Ok(Expr {
                        kind: ExprKind::Ident(name),
                        token,
                    })
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// args ::= expr ("," expr)* | ε
    fn parse_args(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr, token: Token) -> Expr {
    Expr {
        kind: ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        token,
    }
}

/// Helper function to parse source code into a program
pub fn parse(source: &str) -> ParseResult<Program> {
    Parser::new(source).parse_program()
}

/// Helper function to parse a single expression (mostly for tests)
pub fn parse_expr(source: &str) -> ParseResult<Expr> {
    Parser::new(source).parse_expr()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> Expr {
        parse_expr(source).unwrap()
    }

    fn binary_parts(e: &Expr) -> (BinOp, &Expr, &Expr) {
        match &e.kind {
            ExprKind::Binary { op, lhs, rhs } => (*op, lhs, rhs),
            other => panic!("expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(expr("42").kind, ExprKind::IntLit(42));
        assert_eq!(expr("3.5").kind, ExprKind::FloatLit(3.5));
        assert_eq!(expr(".25").kind, ExprKind::FloatLit(0.25));
        assert_eq!(expr("5.").kind, ExprKind::FloatLit(5.0));
        assert_eq!(expr("true").kind, ExprKind::BoolLit(true));
        assert_eq!(expr("false").kind, ExprKind::BoolLit(false));
    }

    #[test]
    fn test_int_literal_out_of_range() {
        let err = parse_expr("99999999999999999999").unwrap_err();
        assert!(matches!(err, ParseError::IntOutOfRange { .. }));
    }

    #[test]
    fn test_mul_binds_tighter_than_add() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let e = expr("1 + 2 * 3");
        let (op, lhs, rhs) = binary_parts(&e);
        assert_eq!(op, BinOp::Add);
        assert_eq!(lhs.kind, ExprKind::IntLit(1));
        let (op, _, _) = binary_parts(rhs);
        assert_eq!(op, BinOp::Mul);
    }

    #[test]
    fn test_relational_binds_tighter_than_equality() {
        // 1 < 2 == true parses as (1 < 2) == true
        let e = expr("1 < 2 == true");
        let (op, lhs, rhs) = binary_parts(&e);
        assert_eq!(op, BinOp::Eq);
        let (inner, _, _) = binary_parts(lhs);
        assert_eq!(inner, BinOp::Lt);
        assert_eq!(rhs.kind, ExprKind::BoolLit(true));
    }

    #[test]
    fn test_logical_precedence() {
        // a || b && c parses as a || (b && c)
        let e = expr("a || b && c");
        let (op, _, rhs) = binary_parts(&e);
        assert_eq!(op, BinOp::Or);
        let (inner, _, _) = binary_parts(rhs);
        assert_eq!(inner, BinOp::And);
    }

    #[test]
    fn test_left_associativity() {
        // 1 - 2 - 3 parses as (1 - 2) - 3
        let e = expr("1 - 2 - 3");
        let (op, lhs, rhs) = binary_parts(&e);
        assert_eq!(op, BinOp::Sub);
        assert_eq!(rhs.kind, ExprKind::IntLit(3));
        let (inner, _, _) = binary_parts(lhs);
        assert_eq!(inner, BinOp::Sub);
    }

    #[test]
    fn test_parens_override_precedence() {
        // (1 + 2) * 3
        let e = expr("(1 + 2) * 3");
        let (op, lhs, _) = binary_parts(&e);
        assert_eq!(op, BinOp::Mul);
        let (inner, _, _) = binary_parts(lhs);
        assert_eq!(inner, BinOp::Add);
    }

    #[test]
    fn test_unary_chain() {
        let e = expr("-!x");
        match &e.kind {
            ExprKind::Unary { op, operand } => {
                assert_eq!(*op, UnOp::Neg);
                assert!(matches!(
                    operand.kind,
                    ExprKind::Unary { op: UnOp::Not, .. }
                ));
            }
            other => panic!("expected unary, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_is_right_associative() {
        // a = b = 1 parses as a = (b = 1)
        let e = expr("a = b = 1");
        match &e.kind {
            ExprKind::Assign { name, value } => {
                assert_eq!(name, "a");
                assert!(matches!(value.kind, ExprKind::Assign { .. }));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_ident_without_assign_is_expression() {
        // `a == b` must not be mistaken for an assignment
        let e = expr("a == b");
        let (op, _, _) = binary_parts(&e);
        assert_eq!(op, BinOp::Eq);
    }

    #[test]
    fn test_call_with_args() {
        let e = expr("f(1, x, 2.5)");
        match &e.kind {
            ExprKind::Call { callee, args } => {
                assert_eq!(callee, "f");
                assert_eq!(args.len(), 3);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_call_without_args() {
        let e = expr("f()");
        match &e.kind {
            ExprKind::Call { callee, args } => {
                assert_eq!(callee, "f");
                assert!(args.is_empty());
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_function() {
        let program = parse("int main() { return 0; }").unwrap();
        assert_eq!(program.decls.len(), 1);
        match &program.decls[0] {
            Decl::Function(f) => {
                assert_eq!(f.name, "main");
                assert_eq!(f.ret, Ty::Int);
                assert!(f.params.is_empty());
                assert_eq!(f.body.stmts.len(), 1);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_void_param_list() {
        let program = parse("int main(void) { return 0; }").unwrap();
        match &program.decls[0] {
            Decl::Function(f) => assert!(f.params.is_empty()),
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_params() {
        let program = parse("float f(int a, float b, bool c) { return b; }").unwrap();
        match &program.decls[0] {
            Decl::Function(f) => {
                assert_eq!(f.params.len(), 3);
                assert_eq!(f.params[0].ty, Ty::Int);
                assert_eq!(f.params[1].ty, Ty::Float);
                assert_eq!(f.params[2].ty, Ty::Bool);
                assert_eq!(f.params[2].name, "c");
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_extern() {
        let program = parse("extern int print_int(int x); int main() { return 0; }").unwrap();
        assert_eq!(program.externs.len(), 1);
        assert_eq!(program.externs[0].name, "print_int");
        assert_eq!(program.externs[0].ret, Ty::Int);
        assert_eq!(program.externs[0].params.len(), 1);
    }

    #[test]
    fn test_parse_global_variable() {
        let program = parse("int counter; int main() { return counter; }").unwrap();
        assert_eq!(program.decls.len(), 2);
        match &program.decls[0] {
            Decl::Var(v) => {
                assert_eq!(v.name, "counter");
                assert_eq!(v.ty, Ty::Int);
            }
            other => panic!("expected variable, got {:?}", other),
        }
    }

    #[test]
    fn test_local_decls_before_stmts() {
        let program = parse("int main() { int x; int y; x = 1; return x; }").unwrap();
        match &program.decls[0] {
            Decl::Function(f) => {
                assert_eq!(f.body.decls.len(), 2);
                assert_eq!(f.body.stmts.len(), 2);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_local_decl_after_stmt_is_error() {
        let result = parse("int main() { x = 1; int x; return x; }");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_if_else() {
        let program = parse("int main() { if (1 < 2) { return 1; } else { return 2; } }").unwrap();
        match &program.decls[0] {
            Decl::Function(f) => match &f.body.stmts[0] {
                Stmt::If(s) => {
                    assert!(s.else_block.is_some());
                }
                other => panic!("expected if, got {:?}", other),
            },
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_if_body_requires_braces() {
        let result = parse("int main() { if (1) return 1; return 0; }");
        assert!(result.is_err());
    }

    #[test]
    fn test_while_body_is_a_statement() {
        // no braces needed around the body of a while
        let program = parse("int main() { int i; i = 0; while (i < 3) i = i + 1; return i; }")
            .unwrap();
        match &program.decls[0] {
            Decl::Function(f) => match &f.body.stmts[1] {
                Stmt::While(w) => {
                    assert!(matches!(*w.body, Stmt::Expr(_)));
                }
                other => panic!("expected while, got {:?}", other),
            },
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_statement_is_dropped() {
        let program = parse("int main() { ;; return 0; }").unwrap();
        match &program.decls[0] {
            Decl::Function(f) => assert_eq!(f.body.stmts.len(), 1),
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_void_global_is_error() {
        let result = parse("void x; int main() { return 0; }");
        assert!(result.is_err());
    }

    #[test]
    fn test_error_reports_position() {
        let err = parse("int main() {\n  return @;\n}").unwrap_err();
        let pos = err.pos();
        assert_eq!(pos.line, 2);
    }

    #[test]
    fn test_extern_after_decl_is_error() {
        // externs must come before all other declarations
        let result = parse("int main() { return 0; } extern int f();");
        assert!(result.is_err());
    }
}
