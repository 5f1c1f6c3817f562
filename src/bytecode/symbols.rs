use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Constant,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub index: usize,
    pub scope_level: usize,
}

/// Compile-time name registry. Each name maps to a stack of bindings so
/// an inner declaration shadows an outer one without destroying it;
/// leaving a scope pops every binding declared inside it and any
/// shadowed outer binding becomes visible again. Indices are allocated
/// monotonically for the lifetime of the table.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Vec<Symbol>>,
    scope_level: usize,
    next_index: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.scope_level += 1;
    }

    pub fn exit_scope(&mut self) {
        self.scope_level = self.scope_level.saturating_sub(1);
        let level = self.scope_level;
        self.symbols.retain(|_, bindings| {
            while bindings
                .last()
                .map(|symbol| symbol.scope_level > level)
                .unwrap_or(false)
            {
                bindings.pop();
            }
            !bindings.is_empty()
        });
    }

    /// Declare a name in the current scope. Re-declaring in the same
    /// scope replaces the binding; declaring in an inner scope shadows
    /// the outer one until that scope exits. A freed index is never
    /// reused.
    pub fn add_symbol(&mut self, name: &str, kind: SymbolKind) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        let symbol = Symbol {
            name: name.to_string(),
            kind,
            index,
            scope_level: self.scope_level,
        };

        let bindings = self.symbols.entry(name.to_string()).or_default();
        match bindings.last_mut() {
            Some(top) if top.scope_level == self.scope_level => *top = symbol,
            _ => bindings.push(symbol),
        }
        index
    }

    pub fn get_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name).and_then(|bindings| bindings.last())
    }

    pub fn has_symbol(&self, name: &str) -> bool {
        self.get_symbol(name).is_some()
    }

    pub fn scope_level(&self) -> usize {
        self.scope_level
    }
}

/// Allocates unique label names and records where each one lands in the
/// instruction stream. Jumps are emitted with placeholder targets and
/// patched once every label position is known.
#[derive(Debug, Default)]
pub struct LabelManager {
    counter: usize,
    positions: HashMap<String, usize>,
}

impl LabelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_label(&mut self, prefix: &str) -> String {
        let label = format!("{}_{}", prefix, self.counter);
        self.counter += 1;
        label
    }

    pub fn resolve(&mut self, label: &str, position: usize) {
        self.positions.insert(label.to_string(), position);
    }

    pub fn position_of(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    pub fn created(&self) -> usize {
        self.counter
    }

    pub fn resolved(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_monotonic_across_scopes() {
        let mut table = SymbolTable::new();
        assert_eq!(table.add_symbol("a", SymbolKind::Variable), 0);
        table.enter_scope();
        assert_eq!(table.add_symbol("b", SymbolKind::Variable), 1);
        table.exit_scope();
        // b's index is not reused
        assert_eq!(table.add_symbol("c", SymbolKind::Variable), 2);
    }

    #[test]
    fn exit_scope_prunes_inner_symbols() {
        let mut table = SymbolTable::new();
        table.add_symbol("outer", SymbolKind::Variable);
        table.enter_scope();
        table.add_symbol("inner", SymbolKind::Variable);
        assert!(table.has_symbol("inner"));
        table.exit_scope();
        assert!(!table.has_symbol("inner"));
        assert!(table.has_symbol("outer"));
    }

    #[test]
    fn shadowing_is_legal() {
        let mut table = SymbolTable::new();
        let first = table.add_symbol("x", SymbolKind::Variable);
        table.enter_scope();
        let second = table.add_symbol("x", SymbolKind::Variable);
        assert_ne!(first, second);
        assert_eq!(table.get_symbol("x").map(|s| s.index), Some(second));
    }

    #[test]
    fn shadowed_outer_binding_survives_scope_exit() {
        let mut table = SymbolTable::new();
        let outer = table.add_symbol("x", SymbolKind::Variable);
        table.enter_scope();
        table.add_symbol("x", SymbolKind::Variable);
        table.exit_scope();
        assert!(table.has_symbol("x"));
        assert_eq!(table.get_symbol("x").map(|s| s.index), Some(outer));
    }

    #[test]
    fn same_scope_redeclaration_replaces_the_binding() {
        let mut table = SymbolTable::new();
        table.add_symbol("x", SymbolKind::Variable);
        let second = table.add_symbol("x", SymbolKind::Variable);
        assert_eq!(table.get_symbol("x").map(|s| s.index), Some(second));
        // One binding, so nothing lingers once its scope is gone
        table.enter_scope();
        table.exit_scope();
        assert!(table.has_symbol("x"));
    }

    #[test]
    fn functions_and_variables_are_distinct_kinds() {
        let mut table = SymbolTable::new();
        table.add_symbol("f", SymbolKind::Function);
        assert_eq!(
            table.get_symbol("f").map(|s| s.kind),
            Some(SymbolKind::Function)
        );
    }

    #[test]
    fn labels_are_unique_per_prefix() {
        let mut labels = LabelManager::new();
        let a = labels.create_label("else");
        let b = labels.create_label("else");
        let c = labels.create_label("end_if");
        assert_ne!(a, b);
        assert_eq!(a, "else_0");
        assert_eq!(c, "end_if_2");
    }

    #[test]
    fn resolved_positions_are_queryable() {
        let mut labels = LabelManager::new();
        let label = labels.create_label("else");
        assert_eq!(labels.position_of(&label), None);
        labels.resolve(&label, 7);
        assert_eq!(labels.position_of(&label), Some(7));
        assert_eq!(labels.created(), 1);
        assert_eq!(labels.resolved(), 1);
    }
}
