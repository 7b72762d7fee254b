//! The raw target program, what [generate](crate::passes::generate) hands to
//! [optimize](crate::passes::optimize). It's already plain Python text; the
//! only extra thing carried along is which aliases LOAD declared, because
//! dead-alias elimination needs to know what to look for.

use indexmap::IndexSet;

#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Generated {
    /// newline-terminated pandas program
    pub code: String,
    /// every alias bound by a LOAD, in first-declared order
    pub declared_aliases: IndexSet<String>,
}
impl Generated {
    pub fn lines(&self) -> std::str::Lines<'_> {
        self.code.lines()
    }
}
impl std::fmt::Display for Generated {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}
