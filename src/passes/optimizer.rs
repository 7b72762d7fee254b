//! optimization pass over the generated program text
use crate::target::Generated;

// general principles:
// a LOAD nobody reads is a wasted file read, so it goes
// this only ever removes whole lines, it never rewrites one

/// Decides which declared aliases are dead and strips them out of the
/// program. Should never fail: given a valid program, outputs one too
pub trait AliasElimination {
    fn is_live(&self, alias: &str, code: &str) -> bool;

    fn dead_aliases(&self, generated: &Generated) -> Vec<String> {
        generated
            .declared_aliases
            .iter()
            .filter(|alias| !self.is_live(alias, &generated.code))
            .cloned()
            .collect()
    }

    fn eliminate(&self, generated: &Generated) -> String;
}

/// Works on raw text. An alias is live if something reads a field of it,
/// indexes it, lists it or wraps it (`alias.`, `alias[`, `alias,`, `alias]`,
/// `alias)`), or another alias is bound to it (`other = alias`). Dead
/// aliases take out every line they appear in, even as part of a longer
/// name, so a dead `t` also drops lines mentioning `total`
#[derive(Clone, Copy, Debug, Default)]
pub struct Substring;

impl AliasElimination for Substring {
    fn is_live(&self, alias: &str, code: &str) -> bool {
        let used = ['.', '[', ',', ']', ')'].iter().any(|after| code.contains(&format!("{}{}", alias, after)));
        let bound = format!(" = {}", alias);
        used || code.lines().any(|line| line.ends_with(&bound))
    }

    fn eliminate(&self, generated: &Generated) -> String {
        let dead = self.dead_aliases(generated);
        if !dead.is_empty() {
            debug!("eliminating dead aliases {:?}", dead);
        }
        let mut out = String::new();
        for line in generated.lines() {
            if dead.iter().any(|alias| line.contains(alias.as_str())) {
                trace!("dropped `{}`", line);
                continue;
            }
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// The default optimization: [Substring] dead-alias elimination
pub fn optimize(generated: &Generated) -> String {
    let out = Substring.eliminate(generated);
    debug!("optimized:\n{}", out);
    out
}
