//! Jasmin (JVM textual assembly) emitter.
//!
//! There is no `codegen.c`/`codegen.h` among the retrieved original
//! sources, so this module's instruction set is grounded directly in the
//! call sites that drive it (`examples/original_source/src/simplc.c`'s
//! `gen_1`/`gen_2`/`gen_call`/... calls) plus the public Jasmin assembler
//! grammar, rather than a transcription of missing C. Accumulation style
//! (build a `String` per method body with `write!`/`writeln!`, push
//! finished bodies onto a `Vec<String>`) follows
//! `examples/navicore-cem3/compiler/src/codegen.rs`'s `CodeGen`.

use std::fmt::Write as _;

/// An integer comparison, used by both `while`/`if` guards (branch-if-false)
/// and relational expressions (push 0/1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
}

impl Cmp {
    fn mnemonic(self) -> &'static str {
        match self {
            Cmp::Eq => "if_icmpeq",
            Cmp::Ne => "if_icmpne",
            Cmp::Ge => "if_icmpge",
            Cmp::Gt => "if_icmpgt",
            Cmp::Le => "if_icmple",
            Cmp::Lt => "if_icmplt",
        }
    }
}

/// A scalar's runtime representation, for `read`/`write`/`newarray`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prim {
    Integer,
    Boolean,
}

struct Method {
    name: String,
    descriptor: String,
    body: String,
    max_locals: u32,
}

/// Accumulates Jasmin instructions for the subroutine currently being
/// compiled, and the finished method bodies for all subroutines compiled
/// so far. `init_subroutine`/`close_subroutine` bracket one subroutine;
/// everything emitted between them belongs to its body.
pub struct Emitter {
    class_name: String,
    methods: Vec<Method>,
    current: Option<Method>,
    label_count: u32,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter { class_name: String::new(), methods: Vec::new(), current: None, label_count: 0 }
    }

    pub fn set_class_name(&mut self, name: &str) {
        self.class_name = name.to_string();
    }

    /// Begin a subroutine. `descriptor` is the JVM method descriptor,
    /// e.g. `"(II)I"` for a function taking two ints and returning one.
    pub fn init_subroutine(&mut self, name: &str, descriptor: &str) {
        self.current =
            Some(Method { name: name.to_string(), descriptor: descriptor.to_string(), body: String::new(), max_locals: 1 });
    }

    /// End the current subroutine. `variables_width` is the number of
    /// local-variable-array slots its variables occupy (`get_variables_
    /// width()` in the original), used for `.limit locals`.
    pub fn close_subroutine(&mut self, variables_width: u32) {
        let mut method = self.current.take().expect("close_subroutine without init_subroutine");
        method.max_locals = method.max_locals.max(variables_width);
        self.methods.push(method);
    }

    fn emit(&mut self, line: &str) {
        let method = self.current.as_mut().expect("emit outside a subroutine");
        method.body.push_str("    ");
        method.body.push_str(line);
        method.body.push('\n');
    }

    /// A fresh, class-unique label. Labels are just allocated up front
    /// (`get_label` in the original) and placed later with
    /// [`Emitter::gen_label`].
    pub fn get_label(&mut self) -> u32 {
        self.label_count += 1;
        self.label_count
    }

    pub fn gen_label(&mut self, label: u32) {
        let method = self.current.as_mut().expect("gen_label outside a subroutine");
        let _ = writeln!(method.body, "L{label}:");
    }

    /// A zero-operand instruction: `return`, `ireturn`, `areturn`, `ineg`,
    /// `iadd`, `isub`, `imul`, `idiv`, `irem`, `iand`, `ior`, `ixor`,
    /// `iastore`, `iaload`, `pop`, ...
    pub fn gen_0(&mut self, op: &str) {
        self.emit(op);
    }

    /// An instruction with an integer immediate or local-slot operand:
    /// `ldc <n>`, `iload <n>`, `istore <n>`, `aload <n>`, `astore <n>`.
    pub fn gen_1(&mut self, op: &str, operand: i32) {
        let line = format!("{op} {operand}");
        self.emit(&line);
        if matches!(op, "iload" | "istore" | "aload" | "astore") {
            let method = self.current.as_mut().expect("gen_1 outside a subroutine");
            method.max_locals = method.max_locals.max(operand as u32 + 1);
        }
    }

    /// A branch to a not-yet-placed label: `ifeq L<n>`, `goto L<n>`.
    pub fn gen_branch(&mut self, op: &str, label: u32) {
        let line = format!("{op} L{label}");
        self.emit(&line);
    }

    /// An integer comparison producing a `boolean` (JVM `int` 0/1) value
    /// on the stack: branch-compare, push 1, jump past, push 0.
    pub fn gen_cmp(&mut self, cmp: Cmp) {
        let l_true = self.get_label();
        let l_end = self.get_label();
        self.gen_branch(cmp.mnemonic(), l_true);
        self.gen_1("ldc", 0);
        self.gen_branch("goto", l_end);
        self.gen_label(l_true);
        self.gen_1("ldc", 1);
        self.gen_label(l_end);
    }

    /// `newarray int`.
    pub fn gen_newarray(&mut self) {
        self.emit("newarray int");
    }

    /// Read one value from stdin onto the stack, via the runtime's
    /// `Simpl` support class (spec.md's I/O surface: SIMPL-2021 has no
    /// notion of a stream or format string, just "read an integer" /
    /// "read a boolean").
    pub fn gen_read(&mut self, prim: Prim) {
        match prim {
            Prim::Integer => self.emit("invokestatic Simpl/readInt()I"),
            Prim::Boolean => self.emit("invokestatic Simpl/readBool()Z"),
        }
    }

    pub fn gen_print(&mut self, prim: Prim) {
        match prim {
            Prim::Integer => self.emit("invokestatic Simpl/printInt(I)V"),
            Prim::Boolean => self.emit("invokestatic Simpl/printBool(Z)V"),
        }
    }

    pub fn gen_print_string(&mut self, s: &str) {
        self.emit(&format!("ldc \"{s}\""));
        self.emit("invokestatic Simpl/printString(Ljava/lang/String;)V");
    }

    /// `invokestatic <class>/<name><descriptor>`.
    pub fn gen_call(&mut self, name: &str, descriptor: &str) {
        let class = self.class_name.clone();
        self.emit(&format!("invokestatic {class}/{name}{descriptor}"));
    }

    /// Render the finished `.j` listing for the whole class.
    pub fn to_listing(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, ".class public {}", self.class_name);
        let _ = writeln!(out, ".super java/lang/Object");
        out.push('\n');
        for method in &self.methods {
            let access = if method.name == "main" { "public static" } else { "static" };
            let _ = writeln!(out, ".method {} {}{}", access, method.name, method.descriptor);
            let _ = writeln!(out, "    .limit stack 64");
            let _ = writeln!(out, "    .limit locals {}", method.max_locals);
            out.push_str(&method.body);
            let _ = writeln!(out, ".end method");
            out.push('\n');
        }
        out
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_main_method_renders_limits_and_body() {
        let mut em = Emitter::new();
        em.set_class_name("Test");
        em.init_subroutine("main", "()V");
        em.gen_1("ldc", 1);
        em.gen_0("return");
        em.close_subroutine(1);
        let listing = em.to_listing();
        assert!(listing.contains(".class public Test"));
        assert!(listing.contains(".method public static main()V"));
        assert!(listing.contains(".limit stack 64"));
        assert!(listing.contains("ldc 1"));
        assert!(listing.contains("return"));
    }

    #[test]
    fn labels_are_unique_and_placed_correctly() {
        let mut em = Emitter::new();
        em.set_class_name("Test");
        em.init_subroutine("main", "()V");
        let l1 = em.get_label();
        let l2 = em.get_label();
        assert_ne!(l1, l2);
        em.gen_branch("goto", l1);
        em.gen_label(l1);
        em.gen_branch("ifeq", l2);
        em.gen_label(l2);
        em.gen_0("return");
        em.close_subroutine(1);
        let listing = em.to_listing();
        assert!(listing.contains(&format!("L{l1}:")));
        assert!(listing.contains(&format!("goto L{l1}")));
    }

    #[test]
    fn gen_1_bumps_max_locals_to_cover_highest_slot() {
        let mut em = Emitter::new();
        em.set_class_name("Test");
        em.init_subroutine("main", "()V");
        em.gen_1("istore", 5);
        em.close_subroutine(1);
        assert!(em.to_listing().contains(".limit locals 6"));
    }

    #[test]
    fn gen_cmp_produces_balanced_push_sequence() {
        let mut em = Emitter::new();
        em.set_class_name("Test");
        em.init_subroutine("main", "()V");
        em.gen_cmp(Cmp::Eq);
        em.close_subroutine(1);
        let listing = em.to_listing();
        assert!(listing.contains("if_icmpeq"));
        assert!(listing.contains("ldc 0"));
        assert!(listing.contains("ldc 1"));
    }
}
