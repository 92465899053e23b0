//! Identifier (qstr) table collection
//!
//! The collector watches every fragment the emitter pushes and records each
//! interned-string reference it contains. It is owned by a single generation
//! run and finalized once at the end.

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::fragment::Fragment;

/// Identifier the runtime always interns; never listed in the table
pub const RESERVED_SYMBOL: &str = "__name__";

static QSTR_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"MP_QSTR_([A-Za-z0-9_]+)").expect("qstr token pattern is valid"));

/// Accumulates identifiers referenced by generated code
#[derive(Debug, Default)]
pub struct SymbolCollector {
    symbols: HashSet<String>,
}

impl SymbolCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every identifier referenced by a fragment
    pub fn observe(&mut self, fragment: &Fragment) {
        self.observe_text(&fragment.to_string());
    }

    /// Record every identifier referenced in a piece of text
    pub fn observe_text(&mut self, text: &str) {
        for caps in QSTR_TOKEN.captures_iter(text) {
            let symbol = &caps[1];
            if self.symbols.insert(symbol.to_string()) {
                trace!("new symbol '{}'", symbol);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Sort, drop the reserved identifier and freeze the table
    pub fn finalize(self) -> SymbolTable {
        let mut symbols: Vec<String> = self
            .symbols
            .into_iter()
            .filter(|s| s != RESERVED_SYMBOL)
            .collect();
        symbols.sort();
        SymbolTable { symbols }
    }
}

/// Finalized, sorted identifier table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: Vec<String>,
}

impl SymbolTable {
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.binary_search_by(|s| s.as_str().cmp(symbol)).is_ok()
    }

    /// One `Q(name)` line per identifier, wrapped in the module's guard
    pub fn render(&self, guard: &str) -> String {
        let mut out = format!("#if {}\n", guard);
        for symbol in &self.symbols {
            out.push_str(&format!("Q({})\n", symbol));
        }
        out.push_str(&format!("#endif // {}\n", guard));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::MapValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collects_from_fragments() {
        let mut collector = SymbolCollector::new();
        collector.observe(&Fragment::MapEntry {
            key: "__name__".to_string(),
            value: MapValue::Qstr("example".to_string()),
        });
        collector.observe(&Fragment::MapEntry {
            key: "add".to_string(),
            value: MapValue::Ptr("example_add_obj".to_string()),
        });
        collector.observe(&Fragment::Raw("mp_load_attr(self, MP_QSTR_add);".to_string()));
        assert_eq!(collector.len(), 3);

        let table = collector.finalize();
        assert_eq!(table.symbols(), &["add".to_string(), "example".to_string()]);
        assert!(!table.contains(RESERVED_SYMBOL));
    }

    #[test]
    fn test_finalize_sorts_and_dedups() {
        let mut collector = SymbolCollector::new();
        collector.observe_text("MP_QSTR_zeta MP_QSTR_Alpha MP_QSTR_beta MP_QSTR_zeta MP_QSTR_beta_2");
        let table = collector.finalize();
        assert_eq!(table.symbols(), &["Alpha", "beta", "beta_2", "zeta"]);
        assert!(table.contains("beta"));
        assert!(!table.contains("gamma"));
    }

    #[test]
    fn test_render_guarded() {
        let mut collector = SymbolCollector::new();
        collector.observe_text("MP_QSTR_b MP_QSTR_a MP_QSTR___name__");
        let text = collector.finalize().render("MODULE_EXAMPLE_ENABLED");
        assert_eq!(
            text,
            "#if MODULE_EXAMPLE_ENABLED\nQ(a)\nQ(b)\n#endif // MODULE_EXAMPLE_ENABLED\n"
        );
    }

    #[test]
    fn test_empty_table() {
        let collector = SymbolCollector::new();
        assert!(collector.is_empty());
        assert_eq!(collector.finalize().render("G"), "#if G\n#endif // G\n");
    }
}
