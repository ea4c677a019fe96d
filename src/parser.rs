//! The single-pass compiler: one recursive-descent pass over the token
//! stream that parses, type-checks, and emits Jasmin assembly as it
//! goes, with no intermediate AST.
//!
//! Grounded in `examples/original_source/src/simplc.c`'s grammar and
//! control flow (`parse_program`, `parse_funcdef`, `parse_body`, ...),
//! carried over function-for-function, but reworked from C's global
//! `token`/`return_type`/`position` variables into fields of one
//! `Compiler` struct, in the spirit of
//! `examples/navicore-cem3/compiler/src/parser.rs`'s `Parser` (a struct
//! holding the lookahead and driving itself via `&mut self` methods).
//!
//! Two behaviors deliberately differ from the original and are recorded
//! in DESIGN.md: `<index>` always pushes the array reference before the
//! index expression (the original only did this when the index
//! happened to be a bare numeral, which cannot produce valid bytecode
//! for any other index expression), entering `main`'s body resets the
//! local-variable-offset counter to 1 (the original's counter was a
//! single global left dangling at whatever a preceding `<funcdef>` last
//! set it to), and an empty argument list against a non-nullary
//! signature is now a `TooFewArguments` error instead of silently
//! compiling a call with the wrong arity.

use crate::emitter::{Cmp, Emitter, Prim};
use crate::error::{CompileError, Result};
use crate::position::SourcePos;
use crate::scanner::Scanner;
use crate::symtab::{IdentProps, SymbolTable};
use crate::token::{Token, TokenKind};
use crate::types::{BaseType, IdentKind, Signature, ValType};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReturnKind {
    Procedure,
    Function(ValType),
}

pub struct Compiler<'a> {
    scanner: Scanner<'a>,
    symtab: SymbolTable,
    emitter: Emitter,
    lookahead: Token,
    return_kind: ReturnKind,
}

impl<'a> Compiler<'a> {
    pub fn new(source: &'a str) -> Result<Self> {
        Self::with_max_id_length(source, crate::scanner::MAX_ID_LENGTH)
    }

    /// Like [`Compiler::new`], but overriding the scanner's maximum
    /// identifier length instead of using [`crate::scanner::MAX_ID_LENGTH`].
    pub fn with_max_id_length(source: &'a str, max_id_length: usize) -> Result<Self> {
        let mut scanner = Scanner::with_max_id_length(source, max_id_length);
        let lookahead = scanner.next_token()?;
        Ok(Compiler {
            scanner,
            symtab: SymbolTable::new(),
            emitter: Emitter::new(),
            lookahead,
            return_kind: ReturnKind::Procedure,
        })
    }

    /// Compile the whole program and return the finished Jasmin listing.
    pub fn compile(mut self) -> Result<String> {
        self.parse_program()?;
        Ok(self.emitter.to_listing())
    }

    // --- token plumbing -----------------------------------------------

    fn pos(&self) -> SourcePos {
        self.lookahead.pos
    }

    fn bump(&mut self) -> Result<()> {
        self.lookahead = self.scanner.next_token()?;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<SourcePos> {
        let pos = self.pos();
        if self.lookahead.kind == kind {
            self.bump()?;
            Ok(pos)
        } else {
            Err(CompileError::ExpectedTokenFound {
                pos,
                expected: kind.describe(),
                found: self.lookahead.kind.describe(),
            })
        }
    }

    fn expect_id(&mut self) -> Result<(String, SourcePos)> {
        let pos = self.pos();
        match &self.lookahead.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.bump()?;
                Ok((name, pos))
            }
            other => Err(CompileError::ExpectedTokenFound {
                pos,
                expected: "identifier".to_string(),
                found: other.describe(),
            }),
        }
    }

    // --- grammar --------------------------------------------------------

    /// `<program> = "program" <id> { <funcdef> } <body> .`
    fn parse_program(&mut self) -> Result<()> {
        self.expect(TokenKind::Program)?;
        let (class_name, _) = self.expect_id()?;
        self.emitter.set_class_name(&class_name);

        while self.lookahead.kind == TokenKind::Define {
            self.parse_funcdef()?;
        }

        self.symtab.begin_main();
        self.return_kind = ReturnKind::Procedure;
        self.emitter.init_subroutine("main", "([Ljava/lang/String;)V");
        self.parse_body()?;
        self.emitter.gen_0("return");
        self.emitter.close_subroutine(self.symtab.variables_width());
        Ok(())
    }

    /// `<funcdef> = "define" <id> "(" [<type> <id> {"," <type> <id>}] ")"
    ///              ["->" <type>] <body> .`
    fn parse_funcdef(&mut self) -> Result<()> {
        self.expect(TokenKind::Define)?;
        let (func_id, func_pos) = self.expect_id()?;
        self.expect(TokenKind::LPar)?;

        let mut params: Vec<(ValType, String, SourcePos)> = Vec::new();
        if self.lookahead.kind.is_type_token() {
            params.push(self.parse_param()?);
            while self.lookahead.kind == TokenKind::Comma {
                self.bump()?;
                params.push(self.parse_param()?);
            }
        }
        self.expect(TokenKind::RPar)?;

        let return_type = if self.lookahead.kind == TokenKind::To {
            self.bump()?;
            Some(self.parse_type()?)
        } else {
            None
        };

        let sig = Signature {
            params: params.iter().map(|(t, _, _)| t.clone()).collect(),
            return_type: return_type.clone(),
        };
        self.return_kind = match &return_type {
            Some(t) => ReturnKind::Function(t.clone()),
            None => ReturnKind::Procedure,
        };

        let opened = self
            .symtab
            .open_subroutine(&func_id, IdentProps { kind: IdentKind::Callable(sig.clone()), offset: 0 });
        if !opened {
            return Err(CompileError::MultipleDefinition { pos: func_pos, name: func_id });
        }

        for (ty, name, pos) in &params {
            let inserted = self.symtab.insert_name(name, IdentKind::Variable(ty.clone()));
            if !inserted {
                return Err(CompileError::MultipleDefinition { pos: *pos, name: name.clone() });
            }
        }

        self.emitter.init_subroutine(&func_id, &sig.jvm_descriptor());
        self.parse_body()?;
        self.emitter.close_subroutine(self.symtab.variables_width());
        self.symtab.close_subroutine();
        self.return_kind = ReturnKind::Procedure;
        Ok(())
    }

    fn parse_param(&mut self) -> Result<(ValType, String, SourcePos)> {
        let ty = self.parse_type()?;
        let (name, pos) = self.expect_id()?;
        Ok((ty, name, pos))
    }

    /// `<body> = "begin" { <vardef> } <statements> "end" .`
    fn parse_body(&mut self) -> Result<()> {
        self.expect(TokenKind::Begin)?;
        while self.lookahead.kind.is_type_token() {
            self.parse_vardef()?;
        }
        self.parse_statements()?;
        self.expect(TokenKind::End)?;
        Ok(())
    }

    /// `<statements> = "chill" | <statement> {";" <statement>} .`
    fn parse_statements(&mut self) -> Result<()> {
        if self.lookahead.kind == TokenKind::Chill {
            self.bump()?;
        } else if self.lookahead.kind.starts_statement() {
            self.parse_statement()?;
            while self.lookahead.kind == TokenKind::Semicolon {
                self.bump()?;
                self.parse_statement()?;
            }
        } else {
            return Err(CompileError::StatementExpected { pos: self.pos(), found: self.lookahead.kind.describe() });
        }
        Ok(())
    }

    /// `<type> = ("boolean" | "integer") ["array"] .`
    fn parse_type(&mut self) -> Result<ValType> {
        let base = match self.lookahead.kind {
            TokenKind::Boolean => BaseType::Boolean,
            TokenKind::Integer => BaseType::Integer,
            _ => {
                return Err(CompileError::TypeExpected { pos: self.pos(), found: self.lookahead.kind.describe() })
            }
        };
        self.bump()?;
        if self.lookahead.kind == TokenKind::Array {
            self.bump()?;
            Ok(ValType::Array(base))
        } else {
            Ok(ValType::Scalar(base))
        }
    }

    /// `<vardef> = <type> <id> {"," <id>} ";" .`
    fn parse_vardef(&mut self) -> Result<()> {
        let ty = self.parse_type()?;
        self.declare_one(&ty)?;
        while self.lookahead.kind == TokenKind::Comma {
            self.bump()?;
            self.declare_one(&ty)?;
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    fn declare_one(&mut self, ty: &ValType) -> Result<()> {
        let (name, pos) = self.expect_id()?;
        if !self.symtab.insert_name(&name, IdentKind::Variable(ty.clone())) {
            return Err(CompileError::MultipleDefinition { pos, name });
        }
        Ok(())
    }

    /// `<statement> = <exit> | <if> | <name> | <read> | <while> | <write> .`
    fn parse_statement(&mut self) -> Result<()> {
        match self.lookahead.kind {
            TokenKind::Exit => self.parse_exit(),
            TokenKind::If => self.parse_if(),
            TokenKind::Ident(_) => self.parse_name(),
            TokenKind::Read => self.parse_read(),
            TokenKind::While => self.parse_while(),
            TokenKind::Write => self.parse_write(),
            _ => Err(CompileError::StatementExpected { pos: self.pos(), found: self.lookahead.kind.describe() }),
        }
    }

    /// `<exit> = "exit" [<expr>] .`
    fn parse_exit(&mut self) -> Result<()> {
        let pos = self.pos();
        self.expect(TokenKind::Exit)?;
        if self.lookahead.kind.starts_expr() {
            match self.return_kind.clone() {
                ReturnKind::Procedure => Err(CompileError::ExitExpressionNotAllowedForProcedure { pos }),
                ReturnKind::Function(ret) => {
                    let expr_pos = self.pos();
                    let t1 = self.parse_expr()?;
                    self.emitter.gen_0(if ret.is_array() { "areturn" } else { "ireturn" });
                    self.check_types(&t1, &ret, expr_pos, "'exit' statement")?;
                    Ok(())
                }
            }
        } else if let ReturnKind::Function(_) = self.return_kind {
            Err(CompileError::MissingExitExpressionForFunction { pos })
        } else {
            self.emitter.gen_0("return");
            Ok(())
        }
    }

    /// `<if> = "if" <expr> "then" <statements>
    ///         {"elsif" <expr> "then" <statements>} ["else" <statements>] "end" .`
    fn parse_if(&mut self) -> Result<()> {
        let l_next = self.emitter.get_label();
        let l_end = self.emitter.get_label();

        self.expect(TokenKind::If)?;
        let pos = self.pos();
        let t1 = self.parse_expr()?;
        self.emitter.gen_branch("ifeq", l_next);
        self.check_types(&t1, &ValType::Scalar(BaseType::Boolean), pos, "'if' guard")?;
        self.expect(TokenKind::Then)?;
        self.parse_statements()?;
        self.emitter.gen_branch("goto", l_end);
        self.emitter.gen_label(l_next);

        while self.lookahead.kind == TokenKind::Elsif {
            let l_next = self.emitter.get_label();
            self.bump()?;
            let pos = self.pos();
            let t1 = self.parse_expr()?;
            self.emitter.gen_branch("ifeq", l_next);
            self.check_types(&t1, &ValType::Scalar(BaseType::Boolean), pos, "'elsif' guard")?;
            self.expect(TokenKind::Then)?;
            self.parse_statements()?;
            self.emitter.gen_branch("goto", l_end);
            self.emitter.gen_label(l_next);
        }
        if self.lookahead.kind == TokenKind::Else {
            self.bump()?;
            self.parse_statements()?;
        }
        self.emitter.gen_label(l_end);
        self.expect(TokenKind::End)?;
        Ok(())
    }

    /// `<name> = <id> (<arglist> | [<index>] "<-" (<expr> | "array" <simple>)) .`
    fn parse_name(&mut self) -> Result<()> {
        let (id, id_pos) = self.expect_id()?;
        let prop = self
            .symtab
            .find_name(&id)
            .cloned()
            .ok_or_else(|| CompileError::UnknownIdentifier { pos: id_pos, name: id.clone() })?;

        if self.lookahead.kind == TokenKind::LPar {
            let sig = match &prop.kind {
                IdentKind::Callable(sig) if sig.return_type.is_none() => sig.clone(),
                IdentKind::Callable(_) => {
                    return Err(CompileError::NotAProcedure { pos: id_pos, name: id })
                }
                IdentKind::Variable(_) => return Err(CompileError::NotAProcedure { pos: id_pos, name: id }),
            };
            self.parse_arglist(&id, id_pos, &sig)?;
            self.emitter.gen_call(&id, &sig.jvm_descriptor());
            return Ok(());
        }

        if !matches!(self.lookahead.kind, TokenKind::LBrack | TokenKind::Gets) {
            return Err(CompileError::ArgListOrAssignmentExpected {
                pos: self.pos(),
                found: self.lookahead.kind.describe(),
            });
        }

        let var_type = match &prop.kind {
            IdentKind::Callable(_) => return Err(CompileError::NotAVariable { pos: id_pos, name: id }),
            IdentKind::Variable(t) => t.clone(),
        };

        let (target_type, is_indexed) = if self.lookahead.kind == TokenKind::LBrack {
            if !var_type.is_array() {
                return Err(CompileError::NotAnArray { pos: id_pos, name: id });
            }
            self.parse_index(&id, prop.offset)?;
            (ValType::Scalar(var_type.base()), true)
        } else {
            (var_type.clone(), false)
        };
        let is_whole_array = !is_indexed && var_type.is_array();

        self.expect(TokenKind::Gets)?;
        let pos = self.pos();
        if self.lookahead.kind.starts_expr() {
            let t1 = self.parse_expr()?;
            if is_whole_array {
                self.check_types(&t1, &var_type, pos, &format!("assignment to '{id}'"))?;
            } else if t1.is_array() {
                if is_indexed {
                    self.check_types(&t1, &target_type, pos, &format!("allocation to indexed array '{id}'"))?;
                } else {
                    return Err(CompileError::NotAnArray { pos: id_pos, name: id });
                }
            } else {
                self.check_types(&t1, &target_type, pos, &format!("assignment to '{id}'"))?;
            }
            if is_indexed {
                self.emitter.gen_0("iastore");
            } else {
                self.emitter.gen_1(if is_whole_array { "astore" } else { "istore" }, prop.offset as i32);
            }
        } else if self.lookahead.kind == TokenKind::Array {
            if !var_type.is_array() {
                return Err(CompileError::NotAnArray { pos: id_pos, name: id });
            }
            self.bump()?;
            let pos = self.pos();
            let t1 = self.parse_simple()?;
            self.check_types(&t1, &ValType::Scalar(BaseType::Integer), pos, &format!("array size of '{id}'"))?;
            self.emitter.gen_newarray();
            self.emitter.gen_1("astore", prop.offset as i32);
        } else {
            return Err(CompileError::ArrayAllocationOrExpressionExpected {
                pos: self.pos(),
                found: self.lookahead.kind.describe(),
            });
        }
        Ok(())
    }

    /// `<read> = "read" <id> [<index>] .`
    fn parse_read(&mut self) -> Result<()> {
        self.expect(TokenKind::Read)?;
        let (vname, pos) = self.expect_id()?;
        let prop = self
            .symtab
            .find_name(&vname)
            .cloned()
            .ok_or(CompileError::UnknownIdentifier { pos, name: vname.clone() })?;
        let var_type = match &prop.kind {
            IdentKind::Callable(_) => return Err(CompileError::NotAVariable { pos, name: vname }),
            IdentKind::Variable(t) => t.clone(),
        };

        let is_indexed = if self.lookahead.kind == TokenKind::LBrack {
            if !var_type.is_array() {
                return Err(CompileError::NotAnArray { pos, name: vname });
            }
            self.parse_index(&vname, prop.offset)?;
            true
        } else if var_type.is_array() {
            return Err(CompileError::ScalarVariableExpected { pos, name: vname });
        } else {
            false
        };

        self.emitter.gen_read(if var_type.base() == BaseType::Integer { Prim::Integer } else { Prim::Boolean });
        if is_indexed {
            self.emitter.gen_0("iastore");
        } else {
            self.emitter.gen_1("istore", prop.offset as i32);
        }
        Ok(())
    }

    /// `<while> = "while" <expr> "do" <statements> "end" .`
    fn parse_while(&mut self) -> Result<()> {
        let l_top = self.emitter.get_label();
        let l_end = self.emitter.get_label();

        self.expect(TokenKind::While)?;
        let pos = self.pos();
        self.emitter.gen_label(l_top);
        let t1 = self.parse_expr()?;
        self.emitter.gen_branch("ifeq", l_end);
        self.check_types(&t1, &ValType::Scalar(BaseType::Boolean), pos, "'while' guard")?;
        self.expect(TokenKind::Do)?;
        self.parse_statements()?;
        self.expect(TokenKind::End)?;
        self.emitter.gen_branch("goto", l_top);
        self.emitter.gen_label(l_end);
        Ok(())
    }

    /// `<write> = "write" (<string> | <expr>) {"&" (<string> | <expr>)} .`
    fn parse_write(&mut self) -> Result<()> {
        self.expect(TokenKind::Write)?;
        self.write_item()?;
        while self.lookahead.kind == TokenKind::Ampersand {
            self.bump()?;
            self.write_item()?;
        }
        Ok(())
    }

    fn write_item(&mut self) -> Result<()> {
        let pos = self.pos();
        if let TokenKind::Str(s) = self.lookahead.kind.clone() {
            self.emitter.gen_print_string(&s);
            self.bump()?;
        } else if self.lookahead.kind.starts_expr() {
            let t1 = self.parse_expr()?;
            if t1.is_array() {
                return Err(CompileError::IllegalArrayOperation { pos, op: "write".to_string() });
            }
            self.emitter.gen_print(if t1.base() == BaseType::Integer { Prim::Integer } else { Prim::Boolean });
        } else {
            return Err(CompileError::ExpressionOrStringExpected { pos, found: self.lookahead.kind.describe() });
        }
        Ok(())
    }

    /// `<arglist> = "(" [<expr> {"," <expr>}] ")" .`
    fn parse_arglist(&mut self, id: &str, id_pos: SourcePos, sig: &Signature) -> Result<()> {
        self.expect(TokenKind::LPar)?;
        let mut i = 0usize;
        if self.lookahead.kind.starts_expr() {
            if sig.params.is_empty() {
                return Err(CompileError::TakesNoArguments { pos: id_pos, name: id.to_string() });
            }
            loop {
                let pos = self.pos();
                let t1 = self.parse_expr()?;
                self.check_types(&t1, &sig.params[i], pos, &format!("parameter {} of call to '{id}'", i + 1))?;
                i += 1;
                if self.lookahead.kind != TokenKind::Comma {
                    break;
                }
                if i >= sig.params.len() {
                    return Err(CompileError::TooManyArguments { pos: self.pos(), name: id.to_string() });
                }
                self.bump()?;
            }
            if i < sig.params.len() {
                return Err(CompileError::TooFewArguments { pos: id_pos, name: id.to_string() });
            }
        } else if !sig.params.is_empty() {
            return Err(CompileError::TooFewArguments { pos: id_pos, name: id.to_string() });
        }
        self.expect(TokenKind::RPar)?;
        Ok(())
    }

    /// `<index> = "[" <simple> "]" .`
    ///
    /// Always pushes the array reference before the index value, so the
    /// caller can follow with `iaload`/`iastore` directly.
    fn parse_index(&mut self, _id: &str, offset: u32) -> Result<()> {
        self.emitter.gen_1("aload", offset as i32);
        self.expect(TokenKind::LBrack)?;
        let pos = self.pos();
        let t1 = self.parse_simple()?;
        self.check_types(&t1, &ValType::Scalar(BaseType::Integer), pos, "array index")?;
        self.expect(TokenKind::RBrack)?;
        Ok(())
    }

    /// `<expr> = <simple> [<relop> <simple>] .`
    fn parse_expr(&mut self) -> Result<ValType> {
        let t1 = self.parse_simple()?;
        if self.lookahead.kind.is_relop() {
            let op = self.lookahead.kind.clone();
            if t1.is_array() {
                return Err(CompileError::IllegalArrayOperation { pos: self.pos(), op: op.symbol() });
            }
            let pos = self.pos();
            self.bump()?;
            let t2 = self.parse_simple()?;
            if t2.is_array() {
                return Err(CompileError::IllegalArrayOperation { pos, op: op.symbol() });
            }
            match op {
                TokenKind::Eq | TokenKind::Ne => {
                    self.check_types(&t2, &t1, pos, &format!("operator {}", op.describe()))?;
                    self.emitter.gen_cmp(if op == TokenKind::Eq { Cmp::Eq } else { Cmp::Ne });
                }
                _ => {
                    let int_ty = ValType::Scalar(BaseType::Integer);
                    self.check_types(&t1, &int_ty, pos, &format!("operator {}", op.describe()))?;
                    self.check_types(&t2, &int_ty, pos, &format!("operator {}", op.describe()))?;
                    let cmp = match op {
                        TokenKind::Ge => Cmp::Ge,
                        TokenKind::Gt => Cmp::Gt,
                        TokenKind::Le => Cmp::Le,
                        TokenKind::Lt => Cmp::Lt,
                        _ => unreachable!(),
                    };
                    self.emitter.gen_cmp(cmp);
                }
            }
            Ok(ValType::Scalar(BaseType::Boolean))
        } else {
            Ok(t1)
        }
    }

    /// `<simple> = ["-"] <term> {<addop> <term>} .`
    fn parse_simple(&mut self) -> Result<ValType> {
        let t0 = if self.lookahead.kind == TokenKind::Minus {
            let pos = self.pos();
            self.bump()?;
            let term_pos = self.pos();
            let t = self.parse_term()?;
            self.emitter.gen_0("ineg");
            if t.is_array() {
                return Err(CompileError::IllegalArrayOperation { pos, op: "unary minus".to_string() });
            }
            self.check_types(&t, &ValType::Scalar(BaseType::Integer), term_pos, "unary minus")?;
            t
        } else {
            self.parse_term()?
        };

        if self.lookahead.kind.is_addop() && t0.is_array() {
            return Err(CompileError::IllegalArrayOperation { pos: self.pos(), op: self.lookahead.kind.symbol() });
        }
        let mut t0 = t0;
        while self.lookahead.kind.is_addop() {
            let op = self.lookahead.kind.clone();
            let pos = self.pos();
            self.bump()?;
            let t1 = self.parse_term()?;
            if t1.is_array() {
                return Err(CompileError::IllegalArrayOperation { pos, op: op.symbol() });
            }
            if op == TokenKind::Or {
                let bool_ty = ValType::Scalar(BaseType::Boolean);
                self.check_types(&t0, &bool_ty, pos, &format!("operator {}", op.describe()))?;
                self.check_types(&t1, &bool_ty, pos, &format!("operator {}", op.describe()))?;
                self.emitter.gen_0("ior");
            } else {
                let int_ty = ValType::Scalar(BaseType::Integer);
                self.check_types(&t0, &int_ty, pos, &format!("operator {}", op.describe()))?;
                self.check_types(&t1, &int_ty, pos, &format!("operator {}", op.describe()))?;
                self.emitter.gen_0(if op == TokenKind::Plus { "iadd" } else { "isub" });
            }
            t0 = ValType::Scalar(t0.base());
        }
        Ok(t0)
    }

    /// `<term> = <factor> {<mulop> <factor>} .`
    fn parse_term(&mut self) -> Result<ValType> {
        let mut t0 = self.parse_factor()?;
        if self.lookahead.kind.is_mulop() && t0.is_array() {
            return Err(CompileError::IllegalArrayOperation { pos: self.pos(), op: self.lookahead.kind.symbol() });
        }
        while self.lookahead.kind.is_mulop() {
            let op = self.lookahead.kind.clone();
            let pos = self.pos();
            self.bump()?;
            let t1 = self.parse_factor()?;
            if t1.is_array() {
                return Err(CompileError::IllegalArrayOperation { pos, op: op.symbol() });
            }
            if op == TokenKind::And {
                let bool_ty = ValType::Scalar(BaseType::Boolean);
                self.check_types(&t0, &bool_ty, pos, &format!("operator {}", op.describe()))?;
                self.check_types(&t1, &bool_ty, pos, &format!("operator {}", op.describe()))?;
                self.emitter.gen_0("iand");
            } else {
                let int_ty = ValType::Scalar(BaseType::Integer);
                self.check_types(&t0, &int_ty, pos, &format!("operator {}", op.describe()))?;
                self.check_types(&t1, &int_ty, pos, &format!("operator {}", op.describe()))?;
                let instr = match op {
                    TokenKind::Mul => "imul",
                    TokenKind::Div => "idiv",
                    TokenKind::Mod => "irem",
                    _ => unreachable!(),
                };
                self.emitter.gen_0(instr);
            }
            t0 = ValType::Scalar(t0.base());
        }
        Ok(t0)
    }

    /// `<factor> = <id> [<index> | <arglist>] | <num> | "not" <factor>
    ///           | "true" | "false" | "(" <expr> ")" .`
    fn parse_factor(&mut self) -> Result<ValType> {
        match self.lookahead.kind.clone() {
            TokenKind::Ident(_) => {
                let (vname, pos) = self.expect_id()?;
                let prop = self
                    .symtab
                    .find_name(&vname)
                    .cloned()
                    .ok_or(CompileError::UnknownIdentifier { pos, name: vname.clone() })?;
                if self.lookahead.kind == TokenKind::LBrack {
                    let var_type = match &prop.kind {
                        IdentKind::Variable(t) if t.is_array() => t.clone(),
                        _ => return Err(CompileError::NotAnArray { pos, name: vname }),
                    };
                    self.parse_index(&vname, prop.offset)?;
                    self.emitter.gen_0("iaload");
                    Ok(ValType::Scalar(var_type.base()))
                } else if self.lookahead.kind == TokenKind::LPar {
                    let sig = match &prop.kind {
                        IdentKind::Callable(sig) if sig.return_type.is_some() => sig.clone(),
                        _ => return Err(CompileError::NotAFunction { pos, name: vname }),
                    };
                    self.parse_arglist(&vname, pos, &sig)?;
                    self.emitter.gen_call(&vname, &sig.jvm_descriptor());
                    Ok(sig.return_type.unwrap())
                } else if matches!(&prop.kind, IdentKind::Callable(sig) if sig.return_type.is_some()) {
                    Err(CompileError::MissingFunctionArgList { pos, name: vname })
                } else {
                    match &prop.kind {
                        IdentKind::Variable(t) => {
                            self.emitter.gen_1(if t.is_array() { "aload" } else { "iload" }, prop.offset as i32);
                            Ok(t.clone())
                        }
                        IdentKind::Callable(_) => Err(CompileError::NotAVariable { pos, name: vname }),
                    }
                }
            }
            TokenKind::Number(n) => {
                self.emitter.gen_1("ldc", n);
                self.bump()?;
                Ok(ValType::Scalar(BaseType::Integer))
            }
            TokenKind::Not => {
                self.bump()?;
                let pos = self.pos();
                let t0 = self.parse_factor()?;
                self.check_types(&t0, &ValType::Scalar(BaseType::Boolean), pos, "'not'")?;
                self.emitter.gen_1("ldc", 1);
                self.emitter.gen_0("ixor");
                Ok(t0)
            }
            TokenKind::True => {
                self.emitter.gen_1("ldc", 1);
                self.bump()?;
                Ok(ValType::Scalar(BaseType::Boolean))
            }
            TokenKind::False => {
                self.emitter.gen_1("ldc", 0);
                self.bump()?;
                Ok(ValType::Scalar(BaseType::Boolean))
            }
            TokenKind::LPar => {
                self.bump()?;
                let t0 = self.parse_expr()?;
                self.expect(TokenKind::RPar)?;
                Ok(t0)
            }
            other => Err(CompileError::FactorExpected { pos: self.pos(), found: other.describe() }),
        }
    }

    fn check_types(&self, found: &ValType, expected: &ValType, pos: SourcePos, context: &str) -> Result<()> {
        if found == expected {
            Ok(())
        } else {
            Err(CompileError::IncompatibleTypes {
                pos,
                expected: expected.to_string(),
                found: found.to_string(),
                context: context.to_string(),
            })
        }
    }
}

/// Compile a complete SIMPL-2021 source string into a Jasmin listing.
pub fn compile_source(source: &str) -> Result<String> {
    Compiler::new(source)?.compile()
}

/// Like [`compile_source`], but overriding the maximum identifier
/// length instead of the built-in [`crate::scanner::MAX_ID_LENGTH`].
pub fn compile_source_with_max_id_length(source: &str, max_id_length: usize) -> Result<String> {
    Compiler::with_max_id_length(source, max_id_length)?.compile()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(src: &str) -> String {
        compile_source(src).expect("expected successful compilation")
    }

    #[test]
    fn empty_program_emits_main_returning() {
        let listing = compiled("program P begin chill end");
        assert!(listing.contains(".class public P"));
        assert!(listing.contains(".method public static main([Ljava/lang/String;)V"));
        assert!(listing.contains("return"));
    }

    #[test]
    fn arithmetic_and_assignment_compile() {
        let listing = compiled(
            "program P
             begin
               integer x, y;
               x <- 1 + 2 * 3;
               y <- x - 1
             end",
        );
        assert!(listing.contains("iadd"));
        assert!(listing.contains("imul"));
        assert!(listing.contains("isub"));
    }

    #[test]
    fn while_loop_emits_labels_and_guard() {
        let listing = compiled(
            "program P
             begin
               integer x;
               x <- 0;
               while x < 10 do
                 x <- x + 1
               end
             end",
        );
        assert!(listing.contains("if_icmplt"));
        assert!(listing.contains("goto"));
    }

    #[test]
    fn function_call_with_matching_signature() {
        let listing = compiled(
            "program P
             define add(integer a, integer b) -> integer
             begin
               exit a + b
             end
             begin
               integer z;
               z <- add(1, 2)
             end",
        );
        assert!(listing.contains(".method static add(II)I"));
        assert!(listing.contains("invokestatic P/add(II)I"));
    }

    #[test]
    fn unknown_identifier_is_an_error() {
        let err = compile_source("program P begin x <- 1 end").unwrap_err();
        assert!(matches!(err, CompileError::UnknownIdentifier { .. }));
    }

    #[test]
    fn type_mismatch_in_assignment_is_an_error() {
        let err = compile_source(
            "program P
             begin
               integer x;
               x <- true
             end",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::IncompatibleTypes { .. }));
    }

    #[test]
    fn array_declare_index_and_use() {
        let listing = compiled(
            "program P
             begin
               integer a array;
               a <- array 10;
               a[0] <- 5;
               write a[0]
             end",
        );
        assert!(listing.contains("newarray int"));
        assert!(listing.contains("iastore"));
        assert!(listing.contains("iaload"));
    }

    #[test]
    fn array_used_in_arithmetic_is_illegal() {
        let err = compile_source(
            "program P
             begin
               integer a array;
               a <- array 1;
               write a + 1
             end",
        )
        .unwrap_err();
        match &err {
            CompileError::IllegalArrayOperation { op, .. } => assert_eq!(op, "+"),
            other => panic!("expected IllegalArrayOperation, got {other:?}"),
        }
        assert!(err.to_string().contains("illegal array operation '+'"), "message was: {err}");
    }

    #[test]
    fn procedure_cannot_have_exit_expression() {
        let err = compile_source(
            "program P
             define p()
             begin
               exit 1
             end
             begin chill end",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::ExitExpressionNotAllowedForProcedure { .. }));
    }

    #[test]
    fn function_without_exit_expression_is_an_error() {
        let err = compile_source(
            "program P
             define f() -> integer
             begin
               exit
             end
             begin chill end",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::MissingExitExpressionForFunction { .. }));
    }

    #[test]
    fn sibling_subroutine_cannot_see_global_variable() {
        let err = compile_source(
            "program P
             define p()
             begin
               write g
             end
             begin
               integer g;
               g <- 1
             end",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::UnknownIdentifier { .. }));
    }
}
