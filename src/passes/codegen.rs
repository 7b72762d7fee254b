// Turns the syntax tree into a pandas program, one block of lines per
// statement. Nothing here fails: anything the program asks for that can't be
// done gets a warning and a python comment instead

use crate::ast::*;
use crate::passes::filter::{compile_filter, target_operator};
use crate::target::Generated;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

static PRELUDE: &str = "from pathlib import Path\nimport pandas as pd\n\n";
static DEFAULT_ALIAS: &str = "a0";
// scratch names the generated program reuses for every DISPLAY / STORE / REMOVE
static DERIVED: &str = "a1";
static MASK: &str = "a2";
static RESULT: &str = "a4";

/// The first alias that read a file, and with which header setting
struct LoadRecord {
    header: bool,
    alias: String,
}

struct Context {
    active_alias: String,
    active_path: Option<String>,
    declared_aliases: IndexSet<String>,
    /// path -> the load that actually read it, for reusing reads
    loads: IndexMap<String, LoadRecord>,
    /// alias -> path it was loaded from, for DELETE
    alias_paths: HashMap<String, String>,
    needs_prelude: bool,
}

impl Context {
    fn new() -> Self {
        Context {
            active_alias: DEFAULT_ALIAS.to_string(),
            active_path: None,
            declared_aliases: IndexSet::new(),
            loads: IndexMap::new(),
            alias_paths: HashMap::new(),
            needs_prelude: false,
        }
    }

    /// The file at `path` changed, so a later LOAD of it has to read again
    fn written(&mut self, path: &str) {
        if self.loads.shift_remove(path).is_some() {
            trace!("{} was written to, forgetting its earlier read", path);
        }
    }

    /// `alias` now holds other data, so a read it made can't be shared anymore
    fn rebound(&mut self, alias: &str) {
        self.loads.retain(|path, prior| {
            let keep = prior.alias != alias;
            if !keep {
                trace!("{} was rebound, forgetting its read of {}", alias, path);
            }
            keep
        });
    }

    fn load(&mut self, load: &Load) -> Vec<String> {
        self.needs_prelude = true;
        let header = load.attributes.header().unwrap_or(false);
        let alias = load.attributes.tag().map(unquote).unwrap_or(DEFAULT_ALIAS).to_string();
        self.alias_paths.insert(alias.clone(), load.path.clone());
        self.active_alias = alias.clone();
        self.active_path = Some(load.path.clone());
        self.declared_aliases.insert(alias.clone());

        let prior = self
            .loads
            .get(&load.path)
            .filter(|prior| prior.header == header)
            .map(|prior| prior.alias.clone());
        if prior.as_ref() != Some(&alias) {
            self.rebound(&alias);
        }
        if let Some(prior) = prior {
            trace!("{} reuses the read of {} by {}", alias, load.path, prior);
            return vec![format!("{} = {}", alias, prior)];
        }
        let line = format!(
            "{} = pd.read_csv({}, header={})",
            alias,
            load.path,
            if header { "[0]" } else { "None" }
        );
        self.loads.insert(load.path.clone(), LoadRecord { header, alias });
        vec![line]
    }

    /// Everything DISPLAY and STORE share: derived columns, then the
    /// sort / filter / head chain into the result
    fn select(&self, select: &Select) -> Vec<String> {
        let mut lines = vec![];
        let mut working = self.active_alias.clone();

        let sort = select.attributes.sort();
        let extended = std::iter::once(&select.selection).chain(sort);
        for selection in extended {
            let derived = derive_lines(selection);
            if derived.is_empty() {
                continue;
            }
            if working != DERIVED {
                lines.push(format!("{} = {}.copy()", DERIVED, working));
                working = DERIVED.to_string();
            }
            lines.extend(derived);
        }

        let mut chain = working.clone();
        match sort {
            Some(Selection::Columns(columns)) => {
                chain += &format!(".sort_values(by=[{}])", column_names(columns));
            }
            Some(Selection::Indices(indices)) => {
                chain += &format!(
                    ".sort_values(by=[{}.columns[i] for i in [{}]])",
                    working,
                    zero_based(indices)
                );
            }
            None => (),
        }
        if let Some(condition) = select.attributes.filter() {
            chain += &format!(".loc[{}]", compile_filter(condition, &working));
        }
        if let Some(num) = select.attributes.num() {
            chain += &format!(".head({})", num);
        }
        lines.push(format!("{} = ({})", RESULT, chain));
        lines
    }

    fn display(&self, select: &Select) -> Vec<String> {
        let mut lines = self.select(select);
        let projected = projection(&select.selection);
        if select.attributes.header() == Some(false) {
            lines.push(format!("print({}.to_string(header=False))", projected));
        } else {
            lines.push(format!("print({})", projected));
        }
        lines.push("print()".to_string());
        lines
    }

    fn store(&mut self, select: &Select) -> Vec<String> {
        let mut lines = self.select(select);
        // the parser doesn't let a STORE through without one
        let path = select.attributes.path().unwrap_or("\"\"");
        let header = if select.attributes.header() == Some(false) { ", header=False" } else { "" };
        lines.push(format!("{}.to_csv({}, index=False{})", projection(&select.selection), path, header));
        self.written(path);
        lines
    }

    fn print(&self, print: &Print) -> Vec<String> {
        let aggregate = match &print.aggregate {
            Some(aggregate) => aggregate,
            None => return vec![format!("print({})", print.message)],
        };
        let alias = print.tag.as_ref().map(|t| unquote(t)).unwrap_or(self.active_alias.as_str());
        let column = match &aggregate.column {
            AggregateColumn::Column(name) => name.clone(),
            AggregateColumn::Index(index) => format!("{}.columns[{}]", alias, index - 1),
        };
        vec![format!(
            "print({}, {}[{}].{}())",
            print.message,
            alias,
            column,
            aggregate_method(aggregate.func)
        )]
    }

    fn merge(&mut self, merge: &Merge) -> Vec<String> {
        self.needs_prelude = true;
        let aliases = merge.tags.iter().map(|t| unquote(t)).collect::<Vec<_>>().join(", ");
        match (merge.attributes.save(), merge.attributes.path()) {
            (Some(true), Some(path)) => {
                let line = format!("pd.concat([{}]).to_csv({}, index=False)", aliases, path);
                self.written(path);
                vec![line]
            }
            _ => vec![format!("print(pd.concat([{}]))", aliases), "print()".to_string()],
        }
    }

    fn delete(&mut self, delete: &Delete) -> Vec<String> {
        let alias = unquote(&delete.tag);
        let path = match self.alias_paths.get(alias) {
            Some(path) => path.clone(),
            None => {
                warn!("DELETE of {}, which no LOAD ever tagged", alias);
                return vec![format!("# DELETE skipped: nothing was loaded as {}", alias)];
            }
        };
        self.needs_prelude = true;
        self.written(&path);
        vec![format!("file_path = Path({})", path), "file_path.unlink()".to_string()]
    }

    fn create(&mut self, create: &Create) -> Vec<String> {
        self.active_alias = DEFAULT_ALIAS.to_string();
        self.active_path = Some(create.path.clone());
        self.written(&create.path);
        vec![format!("open({}, \"w\").close()", create.path)]
    }

    fn add(&mut self, tuples: &[Tuple]) -> Vec<String> {
        let path = match &self.active_path {
            Some(path) => path.clone(),
            None => {
                warn!("ADD before any LOAD or CREATE, there is no file to add to");
                return vec!["# ADD skipped: no active file".to_string()];
            }
        };
        self.needs_prelude = true;
        let mut lines = vec![format!("with open({}, \"a\") as file:", path)];
        for tuple in tuples {
            let row = tuple.0.iter().map(|v| unquote(v)).collect::<Vec<_>>().join(",");
            lines.push(format!("\tfile.write(\"{}\\n\")", row));
        }
        lines.push(format!("{} = pd.read_csv({}, header=[0])", self.active_alias, path));
        self.written(&path);
        let alias = self.active_alias.clone();
        self.rebound(&alias);
        lines
    }

    fn remove(&mut self, tuples: &[Tuple]) -> Vec<String> {
        let path = match &self.active_path {
            Some(path) => path.clone(),
            None => {
                warn!("REMOVE before any LOAD or CREATE, there is no file to remove from");
                return vec!["# REMOVE skipped: no active file".to_string()];
            }
        };
        let alias = self.active_alias.clone();
        let rows = tuples.iter().map(python_tuple).collect::<Vec<_>>().join(", ");
        let lines = vec![
            format!(
                "{} = {}.apply(lambda row: tuple(row.dropna().values) in [{}], axis=1)",
                MASK, alias, rows
            ),
            format!("{} = {}[~{}]", alias, alias, MASK),
            format!("{}.to_csv({}, index=False, header=False)", alias, path),
        ];
        self.written(&path);
        self.rebound(&alias);
        lines
    }

    fn statement(&mut self, statement: &Statement) -> Vec<String> {
        match statement {
            Statement::Load(load) => self.load(load),
            Statement::Display(select) => self.display(select),
            Statement::Store(select) => self.store(select),
            Statement::Print(print) => self.print(print),
            Statement::Merge(merge) => self.merge(merge),
            Statement::Delete(delete) => self.delete(delete),
            Statement::Create(create) => self.create(create),
            Statement::Add(tuples) => self.add(tuples),
            Statement::Remove(tuples) => self.remove(tuples),
        }
    }
}

fn aggregate_method(func: AggregateFn) -> &'static str {
    match func {
        AggregateFn::Sum => "sum",
        AggregateFn::Average => "mean",
        AggregateFn::Max => "max",
        AggregateFn::Min => "min",
        AggregateFn::Count => "nunique",
    }
}

fn column_names(columns: &[Column]) -> String {
    columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
}

fn zero_based(indices: &[ColIndex]) -> String {
    indices.iter().map(|i| (i.index - 1).to_string()).collect::<Vec<_>>().join(", ")
}

/// Assignments of every extended column of `selection` into the derived set
fn derive_lines(selection: &Selection) -> Vec<String> {
    match selection {
        Selection::Columns(columns) => columns
            .iter()
            .filter_map(|c| c.extension.as_ref().map(|ext| (c, ext)))
            .map(|(c, ext)| {
                let target = format!("{}[{}]", DERIVED, c.name);
                format!("{} = {} {} {}", target, target, target_operator(ext.op), ext.number)
            })
            .collect(),
        Selection::Indices(indices) => indices
            .iter()
            .filter_map(|i| i.extension.as_ref().map(|ext| (i, ext)))
            .map(|(i, ext)| {
                let target = format!("{}.iloc[:, {}]", DERIVED, i.index - 1);
                format!("{} = {} {} {}", target, target, target_operator(ext.op), ext.number)
            })
            .collect(),
    }
}

fn projection(selection: &Selection) -> String {
    match selection {
        Selection::Columns(columns) => format!("{}.loc[:, [{}]]", RESULT, column_names(columns)),
        Selection::Indices(indices) => format!("{}.iloc[:, [{}]]", RESULT, zero_based(indices)),
    }
}

/// A tuple value as python sees it when comparing rows: numbers with at most
/// one decimal point become floats, everything else stays text
fn python_value(lexeme: &str) -> String {
    let raw = unquote(lexeme);
    let numeric = raw.chars().any(|c| c.is_ascii_digit())
        && raw.chars().all(|c| c.is_ascii_digit() || c == '.')
        && raw.matches('.').count() <= 1;
    match raw.parse::<f64>() {
        Ok(value) if numeric => format!("{:?}", value),
        _ => lexeme.to_string(),
    }
}

fn python_tuple(tuple: &Tuple) -> String {
    let values: Vec<_> = tuple.0.iter().map(|v| python_value(v)).collect();
    match values.len() {
        1 => format!("({},)", values[0]),
        _ => format!("({})", values.join(", ")),
    }
}

/// Generates the whole (unoptimized) program. Every statement becomes a
/// newline terminated block; the imports go first if anything needs them
pub fn generate(program: &Program) -> Generated {
    let mut context = Context::new();
    let mut body = String::new();
    for statement in &program.statements {
        let lines = context.statement(statement);
        trace!("{:?} -> {:?}", statement, lines);
        for line in lines {
            body.push_str(&line);
            body.push('\n');
        }
    }
    let code = if context.needs_prelude { format!("{}{}", PRELUDE, body) } else { body };
    debug!("generated:\n{}", code);
    Generated { code, declared_aliases: context.declared_aliases }
}
