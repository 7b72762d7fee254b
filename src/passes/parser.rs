// This is the parser. yay.
//
// Plain recursive descent with one token of lookahead (two when deciding if a
// column is extended). The only backtracking is stepping back over a trailing
// comma so the closing paren expectation points at it.

use crate::{ast::*, Span, Token, TokenKind};

/// What the parser wanted to see: a token kind, optionally restricted to a
/// few lexemes
#[derive(PartialEq, Clone, Debug)]
pub struct Expectation {
    pub kind: TokenKind,
    pub values: &'static [&'static str],
}
impl std::fmt::Display for Expectation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.values.is_empty() {
            write!(f, " {}", self.values.join("|"))?;
        }
        Ok(())
    }
}

#[derive(PartialEq, Clone, Debug)]
pub enum ParseError {
    // Expected, got
    Expected { expected: Expectation, got: Token },
    EOF { expected: String },
    Unexpected { during: &'static str, got: Token },
    Duplicate { attribute: &'static str, span: Span },
    Missing { what: &'static str, context: &'static str, span: Span },
    Invalid { message: String, span: Span },
}
impl ParseError {
    /// where in the source it went wrong, if we know
    pub fn span(&self) -> Option<Span> {
        use ParseError::*;
        match self {
            Expected { got, .. } | Unexpected { got, .. } => Some(got.span),
            EOF { .. } => None,
            Duplicate { span, .. } | Missing { span, .. } | Invalid { span, .. } => Some(*span),
        }
    }
}
impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use ParseError::*;
        match self {
            Expected { expected, got } => write!(
                f,
                "Expected {}, found {}: {} at {}",
                expected, got.kind, got.lexeme, got.span
            ),
            EOF { expected } => write!(f, "Expected {} but found nothing", expected),
            Unexpected { during, got } => {
                write!(f, "Unexpected {} {} in {} at {}", got.kind, got.lexeme, during, got.span)
            }
            Duplicate { attribute, span } => {
                write!(f, "{} attribute already exists at {}", attribute, span)
            }
            Missing { what, context, span } => {
                write!(f, "{} is missing in {} at {}", what, context, span)
            }
            Invalid { message, span } => write!(f, "{} at {}", message, span),
        }
    }
}
// All relevant details in Display and Debug
impl std::error::Error for ParseError {}

type Result<T> = std::result::Result<T, ParseError>;

use crate::TokenKind::{Keyword, Literal, Number, Operator as Op, Separator};

static LOAD_ATTRIBUTES: &[&str] = &["header", "tag"];
static DISPLAY_ATTRIBUTES: &[&str] = &["num", "header", "sort", "filter"];
static STORE_ATTRIBUTES: &[&str] = &["num", "header", "sort", "filter", "path"];
static MERGE_ATTRIBUTES: &[&str] = &["save", "path"];

fn pop_no_eof(rtokens: &mut Tokens, parsing_what: &str) -> Result<Token> {
    match rtokens.pop() {
        Some(token) => Ok(token),
        None => Err(ParseError::EOF { expected: parsing_what.to_string() }),
    }
}

/// Only pops if the next token is expected, then returns that token.
/// An empty `values` accepts any lexeme of the right kind
fn expect(
    rtokens: &mut Tokens,
    kind: TokenKind,
    values: &'static [&'static str],
) -> Result<Token> {
    let expected = Expectation { kind, values };
    match rtokens.last() {
        Some(token)
            if token.kind == kind && (values.is_empty() || values.contains(&token.lexeme.as_str())) =>
        {
            pop_no_eof(rtokens, "token")
        }
        Some(got) => Err(ParseError::Expected { expected, got: got.clone() }),
        None => Err(ParseError::EOF { expected: expected.to_string() }),
    }
}

fn is_next(rtokens: &Tokens, kind: TokenKind, lexeme: &str) -> bool {
    rtokens.last().map_or(false, |t| t.is(kind, lexeme))
}

fn next_kind(rtokens: &Tokens) -> Option<TokenKind> {
    rtokens.last().map(|t| t.kind)
}

fn eat_comma(rtokens: &mut Tokens) -> bool {
    if is_next(rtokens, Separator, ",") {
        rtokens.pop();
        true
    } else {
        false
    }
}

/// Closes a parenthesized list. A list that ended on a comma right before
/// the `)` has already eaten it, so step back and let `)` complain about it
fn close(rtokens: &mut Tokens) -> Result<Token> {
    if rtokens.prev().map_or(false, |t| t.is(Separator, ",")) && is_next(rtokens, Separator, ")") {
        rtokens.unpop();
    }
    expect(rtokens, Separator, &[")"])
}

/// The span from `start` to whatever was consumed last
fn span_since(rtokens: &Tokens, start: Span) -> Span {
    match rtokens.prev() {
        Some(last) => Span::set(&[start, last.span]).unwrap_or(start),
        None => start,
    }
}

fn parse_bool(rtokens: &mut Tokens) -> Result<bool> {
    let literal = expect(rtokens, Literal, &[])?;
    Ok(literal.lexeme == "true")
}

fn parse_index(token: &Token) -> Result<usize> {
    match token.lexeme.parse::<usize>() {
        Ok(0) => Err(ParseError::Invalid {
            message: "column indices start at 1, found 0".to_string(),
            span: token.span,
        }),
        Ok(index) => Ok(index),
        Err(_) => Err(ParseError::Invalid {
            message: format!("column index {} is out of range", token.lexeme),
            span: token.span,
        }),
    }
}

fn parse_operator(rtokens: &mut Tokens) -> Result<Operator> {
    let token = expect(rtokens, Op, &[])?;
    // the scanner only ever makes valid operators
    Operator::from_lexeme(&token.lexeme).ok_or_else(|| ParseError::Invalid {
        message: format!("unknown operator {}", token.lexeme),
        span: token.span,
    })
}

/// The optional `op number` after a column or index
fn parse_extension(rtokens: &mut Tokens) -> Result<Option<Extension>> {
    if next_kind(rtokens) != Some(Op) {
        return Ok(None);
    }
    let op = parse_operator(rtokens)?;
    let number = expect(rtokens, Number, &[])?.lexeme;
    Ok(Some(Extension { op, number }))
}

/// A column list or an index list, whichever the next token starts. None if
/// it starts neither. Eats the trailing comma of the last operand
fn parse_selection(rtokens: &mut Tokens) -> Result<Option<Selection>> {
    match next_kind(rtokens) {
        Some(TokenKind::String) => {
            let mut columns = vec![];
            while next_kind(rtokens) == Some(TokenKind::String) {
                let name = pop_no_eof(rtokens, "column")?.lexeme;
                let extension = parse_extension(rtokens)?;
                columns.push(Column { name, extension });
                if !eat_comma(rtokens) {
                    break;
                }
            }
            Ok(Some(Selection::Columns(columns)))
        }
        Some(Number) => {
            let mut indices = vec![];
            while next_kind(rtokens) == Some(Number) {
                let token = pop_no_eof(rtokens, "column index")?;
                let index = parse_index(&token)?;
                let extension = parse_extension(rtokens)?;
                indices.push(ColIndex { index, extension });
                if !eat_comma(rtokens) {
                    break;
                }
            }
            Ok(Some(Selection::Indices(indices)))
        }
        _ => Ok(None),
    }
}

fn parse_string_list(rtokens: &mut Tokens) -> Vec<String> {
    let mut strings = vec![];
    while next_kind(rtokens) == Some(TokenKind::String) {
        if let Some(token) = rtokens.pop() {
            strings.push(token.lexeme);
        }
        if !eat_comma(rtokens) {
            break;
        }
    }
    strings
}

fn parse_operand(rtokens: &mut Tokens) -> Result<Operand> {
    let token = pop_no_eof(rtokens, "expression")?;
    match token.kind {
        TokenKind::String => Ok(Operand::Column(token.lexeme)),
        Number => Ok(Operand::Number(token.lexeme)),
        Separator if token.lexeme == "(" => {
            let condition = parse_condition(rtokens)?;
            expect(rtokens, Separator, &[")"])?;
            Ok(Operand::Condition(Box::new(condition)))
        }
        _ => Err(ParseError::Unexpected { during: "expression", got: token }),
    }
}

/// `expr op expr`, then any number of `& cond` / `| cond` tails. The tail is
/// parsed recursively, so it swallows every connector after it and the
/// first connector ends up outermost: `a & b | c` is `a & (b | c)`
fn parse_condition(rtokens: &mut Tokens) -> Result<Condition> {
    let left = parse_operand(rtokens)?;
    let op = parse_operator(rtokens)?;
    let right = parse_operand(rtokens)?;
    let mut condition = Condition { left, op, right };

    while let Some(op) = rtokens
        .last()
        .filter(|t| t.kind == Op)
        .and_then(|t| Operator::from_lexeme(&t.lexeme))
        .filter(|op| op.is_connector())
    {
        rtokens.pop();
        let next = parse_condition(rtokens)?;
        condition = Condition {
            left: Operand::Condition(Box::new(condition)),
            op,
            right: Operand::Condition(Box::new(next)),
        };
    }
    Ok(condition)
}

fn parse_tag(rtokens: &mut Tokens) -> Result<String> {
    expect(rtokens, Keyword, &["tag"])?;
    expect(rtokens, Op, &["="])?;
    Ok(expect(rtokens, TokenKind::String, &[])?.lexeme)
}

fn parse_attribute(rtokens: &mut Tokens) -> Result<Attribute> {
    let keyword = expect(rtokens, Keyword, &[])?;
    expect(rtokens, Op, &["="])?;
    Ok(match keyword.lexeme.as_str() {
        "header" => Attribute::Header(parse_bool(rtokens)?),
        "save" => Attribute::Save(parse_bool(rtokens)?),
        "tag" => Attribute::Tag(expect(rtokens, TokenKind::String, &[])?.lexeme),
        "path" => Attribute::Path(expect(rtokens, TokenKind::String, &[])?.lexeme),
        "num" => Attribute::Num(expect(rtokens, Number, &[])?.lexeme),
        "sort" => {
            let start = expect(rtokens, Separator, &["("])?.span;
            let selection = parse_selection(rtokens)?.ok_or_else(|| ParseError::Missing {
                what: "column list or index list",
                context: "sort attribute",
                span: span_since(rtokens, start),
            })?;
            close(rtokens)?;
            Attribute::Sort(selection)
        }
        "filter" => {
            expect(rtokens, Separator, &["("])?;
            let condition = parse_condition(rtokens)?;
            expect(rtokens, Separator, &[")"])?;
            Attribute::Filter(condition)
        }
        _ => return Err(ParseError::Unexpected { during: "attribute list", got: keyword }),
    })
}

/// Comma separated attributes drawn from `allowed`, each at most once. Stops
/// quietly on anything else; the caller's closing paren reports it
fn parse_attribute_list(rtokens: &mut Tokens, allowed: &'static [&'static str]) -> Result<Attributes> {
    let mut attributes = Attributes::default();
    while let Some(token) = rtokens.last() {
        let keyword = match allowed.iter().find(|a| token.is(Keyword, a)) {
            Some(keyword) => *keyword,
            None => break,
        };
        if attributes.has(keyword) {
            return Err(ParseError::Duplicate { attribute: keyword, span: token.span });
        }
        attributes.0.push(parse_attribute(rtokens)?);
        if !eat_comma(rtokens) {
            break;
        }
    }
    Ok(attributes)
}

fn parse_load(rtokens: &mut Tokens) -> Result<Load> {
    expect(rtokens, Keyword, &["LOAD"])?;
    expect(rtokens, Separator, &["("])?;
    let path = expect(rtokens, TokenKind::String, &[])?.lexeme;
    let attributes = if eat_comma(rtokens) {
        parse_attribute_list(rtokens, LOAD_ATTRIBUTES)?
    } else {
        Attributes::default()
    };
    close(rtokens)?;
    Ok(Load { path, attributes })
}

/// Shared by DISPLAY and STORE, everything but the statement specific checks
fn parse_select(
    rtokens: &mut Tokens,
    keyword: &'static [&'static str],
    context: &'static str,
    allowed: &'static [&'static str],
) -> Result<Select> {
    let start = expect(rtokens, Keyword, keyword)?.span;
    expect(rtokens, Separator, &["("])?;
    let selection = parse_selection(rtokens)?.ok_or_else(|| ParseError::Missing {
        what: "column list or index list",
        context,
        span: span_since(rtokens, start),
    })?;
    // the list may or may not have eaten a comma already
    let after_comma = rtokens.prev().map_or(false, |t| t.is(Separator, ","));
    if !is_next(rtokens, Separator, ")") && !after_comma {
        expect(rtokens, Separator, &[","])?;
    }
    let attributes = parse_attribute_list(rtokens, allowed)?;
    close(rtokens)?;
    Ok(Select { selection, attributes })
}

fn parse_display(rtokens: &mut Tokens) -> Result<Select> {
    parse_select(rtokens, &["DISPLAY"], "display statement", DISPLAY_ATTRIBUTES)
}

fn parse_store(rtokens: &mut Tokens) -> Result<Select> {
    let start = rtokens.last().map(|t| t.span).unwrap_or_default();
    let select = parse_select(rtokens, &["STORE"], "store statement", STORE_ATTRIBUTES)?;
    let span = span_since(rtokens, start);
    if select.attributes.path().is_none() {
        return Err(ParseError::Missing { what: "path attribute", context: "store statement", span });
    }
    if let Some(Selection::Indices(_)) = select.attributes.sort() {
        return Err(ParseError::Invalid {
            message: "store statement can only sort by column names".to_string(),
            span,
        });
    }
    Ok(select)
}

fn parse_aggregate(rtokens: &mut Tokens) -> Result<Aggregate> {
    let keyword = expect(rtokens, Keyword, AggregateFn::KEYWORDS)?;
    let func = AggregateFn::from_keyword(&keyword.lexeme).ok_or_else(|| ParseError::Unexpected {
        during: "aggregate function",
        got: keyword.clone(),
    })?;
    expect(rtokens, Separator, &["("])?;
    let token = pop_no_eof(rtokens, "aggregate column")?;
    let column = match token.kind {
        TokenKind::String => AggregateColumn::Column(token.lexeme),
        Number => AggregateColumn::Index(parse_index(&token)?),
        _ => return Err(ParseError::Unexpected { during: "aggregate function", got: token }),
    };
    expect(rtokens, Separator, &[")"])?;
    Ok(Aggregate { func, column })
}

fn parse_print(rtokens: &mut Tokens) -> Result<Print> {
    expect(rtokens, Keyword, &["PRINT"])?;
    expect(rtokens, Separator, &["("])?;
    let message = expect(rtokens, TokenKind::String, &[])?.lexeme;
    let mut aggregate = None;
    let mut tag = None;
    if eat_comma(rtokens) {
        if is_next(rtokens, Keyword, "tag") {
            tag = Some(parse_tag(rtokens)?);
        } else {
            aggregate = Some(parse_aggregate(rtokens)?);
            if eat_comma(rtokens) {
                tag = Some(parse_tag(rtokens)?);
            }
        }
    }
    close(rtokens)?;
    Ok(Print { message, aggregate, tag })
}

fn parse_merge(rtokens: &mut Tokens) -> Result<Merge> {
    let start = expect(rtokens, Keyword, &["MERGE"])?.span;
    expect(rtokens, Separator, &["("])?;
    let tags = parse_string_list(rtokens);
    if tags.is_empty() {
        return Err(ParseError::Missing {
            what: "tag list",
            context: "merge statement",
            span: span_since(rtokens, start),
        });
    }
    let attributes = parse_attribute_list(rtokens, MERGE_ATTRIBUTES)?;
    if attributes.save() == Some(true) && attributes.path().is_none() {
        return Err(ParseError::Missing {
            what: "path attribute",
            context: "merge statement with save=true",
            span: span_since(rtokens, start),
        });
    }
    close(rtokens)?;
    Ok(Merge { tags, attributes })
}

fn parse_delete(rtokens: &mut Tokens) -> Result<Delete> {
    expect(rtokens, Keyword, &["DELETE"])?;
    expect(rtokens, Separator, &["("])?;
    let tag = parse_tag(rtokens)?;
    expect(rtokens, Separator, &[")"])?;
    Ok(Delete { tag })
}

fn parse_create(rtokens: &mut Tokens) -> Result<Create> {
    expect(rtokens, Keyword, &["CREATE"])?;
    expect(rtokens, Separator, &["("])?;
    let path = expect(rtokens, TokenKind::String, &[])?.lexeme;
    expect(rtokens, Separator, &[")"])?;
    Ok(Create { path })
}

fn parse_tuple(rtokens: &mut Tokens) -> Result<Tuple> {
    expect(rtokens, Separator, &["("])?;
    let values = parse_string_list(rtokens);
    close(rtokens)?;
    Ok(Tuple(values))
}

/// `( (..), (..), ... )`, as used by ADD and REMOVE
fn parse_tuple_list(rtokens: &mut Tokens) -> Result<Vec<Tuple>> {
    expect(rtokens, Separator, &["("])?;
    let mut tuples = vec![];
    while is_next(rtokens, Separator, "(") {
        tuples.push(parse_tuple(rtokens)?);
        if !eat_comma(rtokens) {
            break;
        }
    }
    close(rtokens)?;
    Ok(tuples)
}

fn parse_statement(rtokens: &mut Tokens) -> Result<Statement> {
    let token = match rtokens.last() {
        Some(token) => token,
        None => return Err(ParseError::EOF { expected: "statement".to_string() }),
    };
    if token.kind != Keyword {
        return Err(ParseError::Unexpected { during: "statement", got: token.clone() });
    }
    Ok(match token.lexeme.as_str() {
        "LOAD" => Statement::Load(parse_load(rtokens)?),
        "DISPLAY" => Statement::Display(parse_display(rtokens)?),
        "STORE" => Statement::Store(parse_store(rtokens)?),
        "PRINT" => Statement::Print(parse_print(rtokens)?),
        "MERGE" => Statement::Merge(parse_merge(rtokens)?),
        "DELETE" => Statement::Delete(parse_delete(rtokens)?),
        "CREATE" => Statement::Create(parse_create(rtokens)?),
        "ADD" => {
            rtokens.pop();
            Statement::Add(parse_tuple_list(rtokens)?)
        }
        "REMOVE" => {
            rtokens.pop();
            Statement::Remove(parse_tuple_list(rtokens)?)
        }
        _ => return Err(ParseError::Unexpected { during: "statement", got: token.clone() }),
    })
}

/// Parses a whole program: statements, each followed by `;`, until the
/// tokens run out. The first problem aborts everything
pub fn parse(mut tokens: Vec<Token>) -> Result<Program> {
    // Reverse so that we can pop the next token off the end
    tokens.reverse();
    let mut rtokens = NoPop::new(&tokens);
    let mut statements = vec![];
    while rtokens.last().is_some() {
        let statement = parse_statement(&mut rtokens)?;
        trace!("parsed {:?}", statement);
        statements.push(statement);
        expect(&mut rtokens, Separator, &[";"])?;
    }
    let program = Program { statements };
    debug!("\n{}", program);
    Ok(program)
}

/// A view over the reversed tokens that "pops" by moving a pointer, so
/// stepping back is just moving it the other way
struct NoPop<'a, T> {
    vec: &'a [T],
    sp: usize,
}
impl<'a, T: Clone> NoPop<'a, T> {
    fn new(vec: &'a [T]) -> Self {
        Self { vec, sp: vec.len() }
    }
    fn pop(&mut self) -> Option<T> {
        if self.sp > 0 {
            self.sp -= 1;
            Some(self.vec[self.sp].clone())
        } else {
            None
        }
    }
    /// undo the last pop
    fn unpop(&mut self) {
        if self.sp < self.vec.len() {
            self.sp += 1;
        }
    }
    fn last(&self) -> Option<&'a T> {
        self.n(1)
    }
    fn n(&self, n: usize) -> Option<&'a T> {
        if self.sp >= n {
            self.vec.get(self.sp - n)
        } else {
            None
        }
    }
    /// the most recently popped
    fn prev(&self) -> Option<&'a T> {
        self.vec.get(self.sp)
    }
}
type Tokens<'a> = NoPop<'a, Token>;

#[cfg(test)]
mod test {
    use super::*;
    use crate::passes::scan;

    fn parse_str(text: &str) -> Result<Program> {
        let (tokens, errors) = scan(text);
        assert!(errors.is_empty(), "test program has lexical errors: {:?}", errors);
        parse(tokens)
    }

    fn parse_one(text: &str) -> Statement {
        let mut program = parse_str(text).expect("test program parse error");
        assert_eq!(program.statements.len(), 1);
        program.statements.remove(0)
    }

    fn err(text: &str) -> String {
        parse_str(text).expect_err("test program should not parse").to_string()
    }

    fn col(name: &str) -> Operand {
        Operand::Column(format!("\"{}\"", name))
    }

    fn num(n: &str) -> Operand {
        Operand::Number(n.to_string())
    }

    fn cond(left: Operand, op: Operator, right: Operand) -> Operand {
        Operand::Condition(Box::new(Condition { left, op, right }))
    }

    #[test]
    fn empty_program() {
        assert_eq!(parse(vec![]), Ok(Program::default()));
    }
    #[test]
    fn load_with_attributes() {
        let statement = parse_one(r#"LOAD("s.csv", tag = "b1", header = true);"#);
        assert_eq!(
            statement,
            Statement::Load(Load {
                path: "\"s.csv\"".to_string(),
                attributes: Attributes(vec![
                    Attribute::Tag("\"b1\"".to_string()),
                    Attribute::Header(true),
                ]),
            })
        );
    }
    #[test]
    fn duplicate_attribute() {
        assert_eq!(
            err(r#"LOAD("s.csv", header = true, header = false);"#),
            "header attribute already exists at 1:30"
        );
    }
    #[test]
    fn attribute_not_allowed_here() {
        assert_eq!(
            err(r#"LOAD("s.csv", num = 3);"#),
            "Expected separator ), found keyword: num at 1:15"
        );
    }
    #[test]
    fn trailing_comma_is_reported() {
        assert_eq!(err(r#"LOAD("s.csv",);"#), "Expected separator ), found separator: , at 1:13");
        assert_eq!(
            err(r#"DISPLAY("a", sort = ("a",));"#),
            "Expected separator ), found separator: , at 1:25"
        );
    }
    #[test]
    fn missing_semicolon() {
        assert_eq!(err(r#"CREATE("x.csv")"#), "Expected separator ; but found nothing");
        assert_eq!(
            err(r#"CREATE("x.csv") CREATE("y.csv");"#),
            "Expected separator ;, found keyword: CREATE at 1:17"
        );
    }
    #[test]
    fn statement_must_start_with_keyword() {
        assert_eq!(err(r#"("x");"#), "Unexpected separator ( in statement at 1:1");
        assert_eq!(err(r#"header = true;"#), "Unexpected keyword header in statement at 1:1");
    }
    #[test]
    fn display_columns_and_attributes() {
        let statement =
            parse_one(r#"DISPLAY("goods", "sales" + 10, num = 2, sort = ("goods"), header = false);"#);
        let select = match statement {
            Statement::Display(select) => select,
            other => panic!("expected display, got {:?}", other),
        };
        assert_eq!(
            select.selection,
            Selection::Columns(vec![
                Column { name: "\"goods\"".to_string(), extension: None },
                Column {
                    name: "\"sales\"".to_string(),
                    extension: Some(Extension { op: Operator::Plus, number: "10".to_string() }),
                },
            ])
        );
        assert_eq!(select.attributes.num(), Some("2"));
        assert_eq!(select.attributes.header(), Some(false));
        assert_eq!(
            select.attributes.sort(),
            Some(&Selection::Columns(vec![Column { name: "\"goods\"".to_string(), extension: None }]))
        );
    }
    #[test]
    fn display_indices() {
        let statement = parse_one("DISPLAY(1, 3 * 2, sort = (2));");
        let select = match statement {
            Statement::Display(select) => select,
            other => panic!("expected display, got {:?}", other),
        };
        assert_eq!(
            select.selection,
            Selection::Indices(vec![
                ColIndex { index: 1, extension: None },
                ColIndex {
                    index: 3,
                    extension: Some(Extension { op: Operator::Times, number: "2".to_string() }),
                },
            ])
        );
    }
    #[test]
    fn display_needs_operands() {
        assert_eq!(
            err("DISPLAY(num = 2);"),
            "column list or index list is missing in display statement at 1:1"
        );
    }
    #[test]
    fn columns_and_indices_do_not_mix() {
        assert_eq!(err(r#"DISPLAY("a", 2);"#), "Expected separator ), found number: 2 at 1:14");
    }
    #[test]
    fn zero_index() {
        assert_eq!(err("DISPLAY(0);"), "column indices start at 1, found 0 at 1:9");
    }
    #[test]
    fn list_needs_comma_before_attributes() {
        assert_eq!(
            err(r#"DISPLAY("a" num = 2);"#),
            "Expected separator ,, found keyword: num at 1:13"
        );
    }
    #[test]
    fn store_requires_path() {
        assert_eq!(err(r#"STORE("a", num = 2);"#), "path attribute is missing in store statement at 1:1");
        match parse_one(r#"STORE("a", path = "o.csv");"#) {
            Statement::Store(select) => assert_eq!(select.attributes.path(), Some("\"o.csv\"")),
            other => panic!("expected store, got {:?}", other),
        }
    }
    #[test]
    fn store_rejects_index_sort() {
        assert_eq!(
            err(r#"STORE("a", sort = (1), path = "o.csv");"#),
            "store statement can only sort by column names at 1:1"
        );
    }
    #[test]
    fn print_forms() {
        assert_eq!(
            parse_one(r#"PRINT("hi");"#),
            Statement::Print(Print { message: "\"hi\"".to_string(), aggregate: None, tag: None })
        );
        assert_eq!(
            parse_one(r#"PRINT("avg: ", AVERAGE("score"), tag = "t");"#),
            Statement::Print(Print {
                message: "\"avg: \"".to_string(),
                aggregate: Some(Aggregate {
                    func: AggregateFn::Average,
                    column: AggregateColumn::Column("\"score\"".to_string()),
                }),
                tag: Some("\"t\"".to_string()),
            })
        );
        assert_eq!(
            parse_one(r#"PRINT("n: ", COUNT(2));"#),
            Statement::Print(Print {
                message: "\"n: \"".to_string(),
                aggregate: Some(Aggregate { func: AggregateFn::Count, column: AggregateColumn::Index(2) }),
                tag: None,
            })
        );
    }
    #[test]
    fn print_bad_aggregate() {
        assert_eq!(
            err(r#"PRINT("x", LOAD("a"));"#),
            "Expected keyword SUM|AVERAGE|MAX|MIN|COUNT, found keyword: LOAD at 1:12"
        );
    }
    #[test]
    fn merge_save_needs_path() {
        assert_eq!(
            err(r#"MERGE("a", "b", save = true);"#),
            "path attribute is missing in merge statement with save=true at 1:1"
        );
        match parse_one(r#"MERGE("a", "b", save = false);"#) {
            Statement::Merge(merge) => {
                assert_eq!(merge.tags, vec!["\"a\"", "\"b\""]);
                assert_eq!(merge.attributes.save(), Some(false));
            }
            other => panic!("expected merge, got {:?}", other),
        }
        assert_eq!(err("MERGE(save = false);"), "tag list is missing in merge statement at 1:1");
    }
    #[test]
    fn delete_and_create() {
        assert_eq!(
            parse_one(r#"DELETE(tag = "t");"#),
            Statement::Delete(Delete { tag: "\"t\"".to_string() })
        );
        assert_eq!(
            parse_one(r#"CREATE("n.csv");"#),
            Statement::Create(Create { path: "\"n.csv\"".to_string() })
        );
        assert_eq!(err(r#"DELETE("t");"#), "Expected keyword tag, found string: \"t\" at 1:8");
    }
    #[test]
    fn tuples() {
        assert_eq!(
            parse_one(r#"ADD(("a", "b"), ("1"));"#),
            Statement::Add(vec![
                Tuple(vec!["\"a\"".to_string(), "\"b\"".to_string()]),
                Tuple(vec!["\"1\"".to_string()]),
            ])
        );
        assert_eq!(err(r#"REMOVE(("a"),);"#), "Expected separator ), found separator: , at 1:13");
    }
    #[test]
    fn first_connector_is_outermost() {
        let statement =
            parse_one(r#"DISPLAY("a", filter = ("a" > 1 & "b" < 2 | "c" = "x"));"#);
        let select = match statement {
            Statement::Display(select) => select,
            other => panic!("expected display, got {:?}", other),
        };
        let expected = Condition {
            left: cond(col("a"), Operator::Greater, num("1")),
            op: Operator::And,
            right: cond(
                cond(col("b"), Operator::Less, num("2")),
                Operator::Or,
                cond(col("c"), Operator::Equal, col("x")),
            ),
        };
        assert_eq!(select.attributes.filter(), Some(&expected));
    }
    #[test]
    fn parenthesized_condition() {
        let statement = parse_one(r#"DISPLAY("a", filter = (("a" >= (2 * 5)) | ("b" <> 3)));"#);
        let select = match statement {
            Statement::Display(select) => select,
            other => panic!("expected display, got {:?}", other),
        };
        let expected = Condition {
            left: cond(col("a"), Operator::GreaterEqual, cond(num("2"), Operator::Times, num("5"))),
            op: Operator::Or,
            right: cond(col("b"), Operator::NotEqual, num("3")),
        };
        assert_eq!(select.attributes.filter(), Some(&expected));
    }
    #[test]
    fn condition_is_one_comparison_per_group() {
        // without parens the `|` takes "b" as its right hand side and stops
        assert_eq!(
            err(r#"DISPLAY("a", filter = (("a" > 1) | "b" <> 3));"#),
            "Expected separator ), found operator: <> at 1:40"
        );
    }
    #[test]
    fn bad_expression() {
        assert_eq!(
            err(r#"DISPLAY("a", filter = (, > 1));"#),
            "Unexpected separator , in expression at 1:24"
        );
    }
}
