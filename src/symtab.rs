//! Two-scope symbol table: one active table for the subroutine currently
//! being compiled, plus at most one saved outer (global) table.
//!
//! SIMPL-2021 has exactly two lexical scopes — global and "the procedure
//! or function being compiled right now" — so there is never a chain of
//! saved tables, only zero or one (`examples/original_source/src/
//! symboltable.c`'s single `saved_table` global). Names in the active
//! scope always win; once a name isn't found there, only the *callable*
//! (procedure/function) names in the outer scope are visible, so a
//! subroutine body can call its siblings but can't accidentally read a
//! global variable by the same name as a local it doesn't have.

use crate::hash_table::HashTable;
use crate::types::IdentKind;

/// One entry: an identifier's kind plus its local-variable-array offset,
/// assigned only to variables (`0` for callables, which carry no slot).
#[derive(Debug, Clone)]
pub struct IdentProps {
    pub kind: IdentKind,
    pub offset: u32,
}

pub struct SymbolTable {
    active: HashTable<String, IdentProps>,
    saved: Option<HashTable<String, IdentProps>>,
    curr_offset: u32,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable { active: HashTable::new(), saved: None, curr_offset: 1 }
    }

    /// Enter a subroutine body's scope: `id` (the subroutine's own name)
    /// is inserted into the still-active (soon to be outer) table first,
    /// then a fresh table becomes active.
    ///
    /// Returns `false` if `id` is already defined in the current scope —
    /// the caller should raise a multiple-definition error and not open
    /// the subroutine scope.
    pub fn open_subroutine(&mut self, id: &str, prop: IdentProps) -> bool {
        if self.active.contains_key(&id.to_string()) {
            return false;
        }
        self.active.insert(id.to_string(), prop);
        let outer = std::mem::replace(&mut self.active, HashTable::new());
        self.saved = Some(outer);
        self.curr_offset = 1;
        true
    }

    /// Reset the local-variable-offset counter before compiling `main`'s
    /// body. `main` shares the global table directly (there is no
    /// subroutine scope to open for it), so without this its variables
    /// would continue numbering from wherever the last `<funcdef>` left
    /// `curr_offset`, instead of starting at 1 like every other method's
    /// local-variable array.
    pub fn begin_main(&mut self) {
        self.curr_offset = 1;
    }

    /// Leave a subroutine body's scope, discarding its local table and
    /// reactivating the outer (global) one.
    pub fn close_subroutine(&mut self) {
        if let Some(outer) = self.saved.take() {
            self.active = outer;
        }
    }

    /// Insert a name into the active scope. Returns `false` if the name
    /// is already visible — locally, or as a callable in the outer scope
    /// (`symboltable.c::insert_name` checks `find_name`, not just the
    /// active table, so a local can't shadow a sibling subroutine's
    /// name) — which the caller turns into a multiple-definition error;
    /// a variable's offset is assigned automatically.
    pub fn insert_name(&mut self, id: &str, kind: IdentKind) -> bool {
        if self.find_name(id).is_some() {
            return false;
        }
        let offset = match &kind {
            IdentKind::Variable(_) => {
                let o = self.curr_offset;
                self.curr_offset += 1;
                o
            }
            IdentKind::Callable(_) => 0,
        };
        self.active.insert(id.to_string(), IdentProps { kind, offset });
        true
    }

    fn find_in_active(&self, id: &str) -> Option<&IdentProps> {
        self.active.get(&id.to_string())
    }

    /// Resolve a name: active scope first; failing that, the outer scope
    /// but only if the outer binding is a procedure or function. A
    /// subroutine body cannot see the global scope's *variables*, only
    /// its callables — this mirrors `symboltable.c::find_name`'s
    /// `IS_CALLABLE_TYPE` guard on the fallback lookup.
    pub fn find_name(&self, id: &str) -> Option<&IdentProps> {
        if let Some(p) = self.find_in_active(id) {
            return Some(p);
        }
        let outer = self.saved.as_ref()?;
        let p = outer.get(&id.to_string())?;
        matches!(p.kind, IdentKind::Callable(_)).then_some(p)
    }

    /// The number of local-variable-array slots the current scope's
    /// variables require, including slot 0 reserved for... nothing in
    /// SIMPL-2021 (there is no implicit `this`), but offsets start at 1
    /// to match the original's convention, so this is `curr_offset`.
    pub fn variables_width(&self) -> u32 {
        self.curr_offset
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BaseType, Signature, ValType};

    fn var(base: BaseType) -> IdentKind {
        IdentKind::Variable(ValType::Scalar(base))
    }

    #[test]
    fn variables_get_increasing_offsets() {
        let mut st = SymbolTable::new();
        assert!(st.insert_name("a", var(BaseType::Integer)));
        assert!(st.insert_name("b", var(BaseType::Boolean)));
        assert_eq!(st.find_name("a").unwrap().offset, 1);
        assert_eq!(st.find_name("b").unwrap().offset, 2);
        assert_eq!(st.variables_width(), 3);
    }

    #[test]
    fn duplicate_insert_in_same_scope_fails() {
        let mut st = SymbolTable::new();
        assert!(st.insert_name("a", var(BaseType::Integer)));
        assert!(!st.insert_name("a", var(BaseType::Boolean)));
    }

    #[test]
    fn subroutine_scope_hides_outer_variables_but_not_callables() {
        let mut st = SymbolTable::new();
        st.insert_name("g", var(BaseType::Integer));
        let sig = Signature { params: vec![], return_type: None };
        let opened = st.open_subroutine(
            "proc1",
            IdentProps { kind: IdentKind::Callable(sig), offset: 0 },
        );
        assert!(opened);
        assert!(st.find_name("g").is_none());
        assert!(st.find_name("proc1").is_some());

        st.insert_name("local", var(BaseType::Integer));
        assert_eq!(st.find_name("local").unwrap().offset, 1);

        st.close_subroutine();
        assert!(st.find_name("g").is_some());
        assert!(st.find_name("local").is_none());
    }

    #[test]
    fn local_variable_cannot_shadow_an_outer_callable() {
        let mut st = SymbolTable::new();
        let sig = Signature { params: vec![], return_type: None };
        assert!(st.open_subroutine("g", IdentProps { kind: IdentKind::Callable(sig), offset: 0 }));
        st.close_subroutine();

        let sig2 = Signature { params: vec![], return_type: None };
        let opened =
            st.open_subroutine("f", IdentProps { kind: IdentKind::Callable(sig2), offset: 0 });
        assert!(opened);
        assert!(!st.insert_name("g", var(BaseType::Integer)));
    }

    #[test]
    fn opening_subroutine_with_duplicate_name_fails_and_does_not_switch_scope() {
        let mut st = SymbolTable::new();
        st.insert_name("proc1", var(BaseType::Integer));
        let sig = Signature { params: vec![], return_type: None };
        let opened = st.open_subroutine(
            "proc1",
            IdentProps { kind: IdentKind::Callable(sig), offset: 0 },
        );
        assert!(!opened);
        // scope was not switched: `proc1` is still the original variable
        assert!(matches!(
            st.find_name("proc1").unwrap().kind,
            IdentKind::Variable(_)
        ));
    }
}
