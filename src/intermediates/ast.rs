//! the Abstract Syntax Tree ([Program]) is the result of parsing, and contains
//! all the data in your program in actual logical chunks, most closely
//! resembling the frontend syntax.
//!
//! the root is [Program], which is just a list of statements. everything below
//! it is a pure ownership tree, no sharing. string payloads (paths, messages,
//! column names, tags, tuple values) keep their surrounding quotes, exactly
//! as they were scanned. Just remember these names refer to **CSVLang**
//! statements, not anything in the generated program.

use std::fmt;

#[derive(PartialEq, Clone, Debug, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(PartialEq, Clone, Debug)]
pub enum Statement {
    Load(Load),
    Display(Select),
    Store(Select),
    Print(Print),
    Merge(Merge),
    Delete(Delete),
    Create(Create),
    Add(Vec<Tuple>),
    Remove(Vec<Tuple>),
}

#[derive(PartialEq, Clone, Debug)]
pub struct Load {
    pub path: String,
    pub attributes: Attributes,
}

/// DISPLAY and STORE share everything except STORE having a mandatory path
#[derive(PartialEq, Clone, Debug)]
pub struct Select {
    pub selection: Selection,
    pub attributes: Attributes,
}

#[derive(PartialEq, Clone, Debug)]
pub struct Print {
    pub message: String,
    pub aggregate: Option<Aggregate>,
    pub tag: Option<String>,
}

#[derive(PartialEq, Clone, Debug)]
pub struct Merge {
    pub tags: Vec<String>,
    pub attributes: Attributes,
}

#[derive(PartialEq, Clone, Debug)]
pub struct Delete {
    pub tag: String,
}

#[derive(PartialEq, Clone, Debug)]
pub struct Create {
    pub path: String,
}

/// One parenthesized row of quoted values in ADD / REMOVE
#[derive(PartialEq, Clone, Debug, Default)]
pub struct Tuple(pub Vec<String>);

#[derive(PartialEq, Clone, Debug)]
pub enum Attribute {
    Header(bool),
    Tag(String),
    Path(String),
    Num(String),
    Sort(Selection),
    Filter(Condition),
    Save(bool),
}
impl Attribute {
    /// The keyword that introduces this attribute in source
    pub fn keyword(&self) -> &'static str {
        use Attribute::*;
        match self {
            Header(_) => "header",
            Tag(_) => "tag",
            Path(_) => "path",
            Num(_) => "num",
            Sort(_) => "sort",
            Filter(_) => "filter",
            Save(_) => "save",
        }
    }
}

/// Attributes in the order they were written. The parser guarantees each
/// kind shows up at most once, so the getters just find the first
#[derive(PartialEq, Clone, Debug, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn has(&self, keyword: &str) -> bool {
        self.0.iter().any(|a| a.keyword() == keyword)
    }
    pub fn header(&self) -> Option<bool> {
        self.0.iter().find_map(|a| match a {
            Attribute::Header(h) => Some(*h),
            _ => None,
        })
    }
    pub fn tag(&self) -> Option<&str> {
        self.0.iter().find_map(|a| match a {
            Attribute::Tag(t) => Some(t.as_str()),
            _ => None,
        })
    }
    pub fn path(&self) -> Option<&str> {
        self.0.iter().find_map(|a| match a {
            Attribute::Path(p) => Some(p.as_str()),
            _ => None,
        })
    }
    pub fn num(&self) -> Option<&str> {
        self.0.iter().find_map(|a| match a {
            Attribute::Num(n) => Some(n.as_str()),
            _ => None,
        })
    }
    pub fn sort(&self) -> Option<&Selection> {
        self.0.iter().find_map(|a| match a {
            Attribute::Sort(s) => Some(s),
            _ => None,
        })
    }
    pub fn filter(&self) -> Option<&Condition> {
        self.0.iter().find_map(|a| match a {
            Attribute::Filter(c) => Some(c),
            _ => None,
        })
    }
    pub fn save(&self) -> Option<bool> {
        self.0.iter().find_map(|a| match a {
            Attribute::Save(s) => Some(*s),
            _ => None,
        })
    }
}

/// Columns are addressed either by name or by 1-based position, never both
/// in the same list
#[derive(PartialEq, Clone, Debug)]
pub enum Selection {
    Columns(Vec<Column>),
    Indices(Vec<ColIndex>),
}
impl Selection {
    pub fn has_extensions(&self) -> bool {
        match self {
            Selection::Columns(cols) => cols.iter().any(|c| c.extension.is_some()),
            Selection::Indices(idxs) => idxs.iter().any(|i| i.extension.is_some()),
        }
    }
}

#[derive(PartialEq, Clone, Debug)]
pub struct Column {
    pub name: String,
    pub extension: Option<Extension>,
}

#[derive(PartialEq, Clone, Debug)]
pub struct ColIndex {
    /// 1-based, as written
    pub index: usize,
    pub extension: Option<Extension>,
}

/// The `op number` tail of an extended column, ie `"sales" + 10`
#[derive(PartialEq, Clone, Debug)]
pub struct Extension {
    pub op: Operator,
    pub number: String,
}

#[derive(PartialEq, Clone, Debug)]
pub struct Aggregate {
    pub func: AggregateFn,
    pub column: AggregateColumn,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum AggregateFn {
    Sum,
    Average,
    Max,
    Min,
    Count,
}
impl AggregateFn {
    pub const KEYWORDS: &'static [&'static str] = &["SUM", "AVERAGE", "MAX", "MIN", "COUNT"];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        use AggregateFn::*;
        match keyword {
            "SUM" => Some(Sum),
            "AVERAGE" => Some(Average),
            "MAX" => Some(Max),
            "MIN" => Some(Min),
            "COUNT" => Some(Count),
            _ => None,
        }
    }
    pub fn keyword(self) -> &'static str {
        use AggregateFn::*;
        match self {
            Sum => "SUM",
            Average => "AVERAGE",
            Max => "MAX",
            Min => "MIN",
            Count => "COUNT",
        }
    }
}

#[derive(PartialEq, Clone, Debug)]
pub enum AggregateColumn {
    Column(String),
    Index(usize),
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Operator {
    Plus,
    Minus,
    Times,
    Divide,
    Mod,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}
impl Operator {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        use Operator::*;
        Some(match lexeme {
            "+" => Plus,
            "-" => Minus,
            "*" => Times,
            "/" => Divide,
            "%" => Mod,
            "=" => Equal,
            "<>" => NotEqual,
            "<" => Less,
            "<=" => LessEqual,
            ">" => Greater,
            ">=" => GreaterEqual,
            "&" => And,
            "|" => Or,
            _ => return None,
        })
    }
    pub fn lexeme(self) -> &'static str {
        use Operator::*;
        match self {
            Plus => "+",
            Minus => "-",
            Times => "*",
            Divide => "/",
            Mod => "%",
            Equal => "=",
            NotEqual => "<>",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            And => "&",
            Or => "|",
        }
    }
    /// `&` and `|`, the only things that chain conditions
    pub fn is_connector(self) -> bool {
        self == Operator::And || self == Operator::Or
    }
}
impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.lexeme())
    }
}

/// `left op right`. Position matters: a column on the right is a literal
#[derive(PartialEq, Clone, Debug)]
pub struct Condition {
    pub left: Operand,
    pub op: Operator,
    pub right: Operand,
}

#[derive(PartialEq, Clone, Debug)]
pub enum Operand {
    Column(String),
    Number(String),
    Condition(Box<Condition>),
}

/// Strips the surrounding quotes off a string lexeme. Anything not quoted
/// comes back as is
pub fn unquote(lexeme: &str) -> &str {
    if lexeme.len() >= 2 && lexeme.starts_with('"') && lexeme.ends_with('"') {
        &lexeme[1..lexeme.len() - 1]
    } else {
        lexeme
    }
}

// Tree rendering. Every node is a `├── NAME` or `├── NAME: value` line and
// children sit four spaces further in

fn node(out: &mut String, depth: usize, name: &str, value: Option<&dyn fmt::Display>) {
    out.push_str(&"    ".repeat(depth));
    out.push_str("├── ");
    out.push_str(name);
    if let Some(value) = value {
        out.push_str(&format!(": {}", value));
    }
    out.push('\n');
}

fn render_attributes(out: &mut String, depth: usize, attributes: &Attributes) {
    for attribute in &attributes.0 {
        match attribute {
            Attribute::Header(h) => node(out, depth, "HEADER-ATTR", Some(h)),
            Attribute::Tag(t) => node(out, depth, "TAG-ATTR", Some(t)),
            Attribute::Path(p) => node(out, depth, "PATH-ATTR", Some(p)),
            Attribute::Num(n) => node(out, depth, "NUM-ATTR", Some(n)),
            Attribute::Save(s) => node(out, depth, "SAVE-ATTR", Some(s)),
            Attribute::Sort(selection) => {
                node(out, depth, "SORT-ATTR", None);
                render_selection(out, depth + 1, selection);
            }
            Attribute::Filter(condition) => {
                node(out, depth, "FILTER-ATTR", None);
                render_condition(out, depth + 1, condition);
            }
        }
    }
}

fn render_extension(out: &mut String, depth: usize, ext: &Extension) {
    node(out, depth, "OPERATOR", Some(&ext.op));
    node(out, depth, "NUMBER", Some(&ext.number));
}

fn render_selection(out: &mut String, depth: usize, selection: &Selection) {
    match selection {
        Selection::Columns(cols) => {
            node(out, depth, "COLUMN-LIST", None);
            for col in cols {
                match &col.extension {
                    None => node(out, depth + 1, "COLUMN", Some(&col.name)),
                    Some(ext) => {
                        node(out, depth + 1, "COLUMN-EXPR", None);
                        node(out, depth + 2, "COLUMN", Some(&col.name));
                        render_extension(out, depth + 2, ext);
                    }
                }
            }
        }
        Selection::Indices(idxs) => {
            node(out, depth, "COL-INDEX-LIST", None);
            for idx in idxs {
                match &idx.extension {
                    None => node(out, depth + 1, "COL-INDEX", Some(&idx.index)),
                    Some(ext) => {
                        node(out, depth + 1, "COL-INDEX-EXPR", None);
                        node(out, depth + 2, "COL-INDEX", Some(&idx.index));
                        render_extension(out, depth + 2, ext);
                    }
                }
            }
        }
    }
}

fn render_operand(out: &mut String, depth: usize, operand: &Operand) {
    match operand {
        Operand::Column(c) => node(out, depth, "COLUMN", Some(c)),
        Operand::Number(n) => node(out, depth, "NUMBER", Some(n)),
        Operand::Condition(c) => render_condition(out, depth, c),
    }
}

fn render_condition(out: &mut String, depth: usize, condition: &Condition) {
    node(out, depth, "CONDITION", None);
    render_operand(out, depth + 1, &condition.left);
    node(out, depth + 1, "OPERATOR", Some(&condition.op));
    render_operand(out, depth + 1, &condition.right);
}

fn render_tuples(out: &mut String, depth: usize, tuples: &[Tuple]) {
    node(out, depth, "TUPLE-LIST", None);
    for tuple in tuples {
        node(out, depth + 1, "TUPLE", None);
        for value in &tuple.0 {
            node(out, depth + 2, "VALUE", Some(value));
        }
    }
}

fn render_statement(out: &mut String, depth: usize, statement: &Statement) {
    match statement {
        Statement::Load(load) => {
            node(out, depth, "LOAD-STMT", None);
            node(out, depth + 1, "PATH", Some(&load.path));
            render_attributes(out, depth + 1, &load.attributes);
        }
        Statement::Display(select) | Statement::Store(select) => {
            let name = match statement {
                Statement::Display(_) => "DISPLAY-STMT",
                _ => "STORE-STMT",
            };
            node(out, depth, name, None);
            render_selection(out, depth + 1, &select.selection);
            render_attributes(out, depth + 1, &select.attributes);
        }
        Statement::Print(print) => {
            node(out, depth, "PRINT-STMT", None);
            node(out, depth + 1, "MESSAGE", Some(&print.message));
            if let Some(aggregate) = &print.aggregate {
                node(out, depth + 1, "AGGR-FUNC", Some(&aggregate.func.keyword()));
                match &aggregate.column {
                    AggregateColumn::Column(c) => node(out, depth + 2, "COLUMN", Some(c)),
                    AggregateColumn::Index(i) => node(out, depth + 2, "COL-INDEX", Some(i)),
                }
            }
            if let Some(tag) = &print.tag {
                node(out, depth + 1, "TAG-ATTR", Some(tag));
            }
        }
        Statement::Merge(merge) => {
            node(out, depth, "MERGE-STMT", None);
            node(out, depth + 1, "TAG-LIST", None);
            for tag in &merge.tags {
                node(out, depth + 2, "TAG", Some(tag));
            }
            render_attributes(out, depth + 1, &merge.attributes);
        }
        Statement::Delete(delete) => {
            node(out, depth, "DELETE-STMT", None);
            node(out, depth + 1, "TAG-ATTR", Some(&delete.tag));
        }
        Statement::Create(create) => {
            node(out, depth, "CREATE-STMT", None);
            node(out, depth + 1, "PATH", Some(&create.path));
        }
        Statement::Add(tuples) => {
            node(out, depth, "ADD-STMT", None);
            render_tuples(out, depth + 1, tuples);
        }
        Statement::Remove(tuples) => {
            node(out, depth, "REMOVE-STMT", None);
            render_tuples(out, depth + 1, tuples);
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut out = String::new();
        node(&mut out, 0, "PROGRAM", None);
        for statement in &self.statements {
            render_statement(&mut out, 1, statement);
        }
        write!(f, "{}", out)
    }
}
