//! Symbol naming rules

mod symbol_naming;

pub use symbol_naming::SymbolNamingRule;
