// Lowers a filter condition into a pandas boolean mask expression, folding
// constant arithmetic on the way

use crate::ast::{Condition, Operand, Operator};

/// One `(multiplicand << shift)` summand of a strength reduced product
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct ShiftTerm {
    pub multiplicand: i64,
    pub shift: u32,
}
impl std::fmt::Display for ShiftTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({} << {})", self.multiplicand, self.shift)
    }
}

/// `multiplicand * multiplier` as a sum of shifts, one for every set bit of
/// the multiplier, lowest first. Multiplying by zero gives no terms at all
pub fn shift_terms(multiplicand: i64, multiplier: u64) -> Vec<ShiftTerm> {
    (0..64)
        .filter(|bit| multiplier >> bit & 1 == 1)
        .map(|shift| ShiftTerm { multiplicand, shift })
        .collect()
}

/// How an operator is spelled in the generated program
pub fn target_operator(op: Operator) -> &'static str {
    match op {
        Operator::Equal => "==",
        Operator::NotEqual => "!=",
        other => other.lexeme(),
    }
}

/// Compiled text, plus whether it can sit next to another operator without
/// parens. A shift sum with more than one term can't
struct Fragment {
    text: String,
    atomic: bool,
}
impl Fragment {
    fn atom(text: String) -> Self {
        Fragment { text, atomic: true }
    }
    fn wrapped(&self) -> String {
        if self.atomic {
            self.text.clone()
        } else {
            format!("({})", self.text)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Num {
    Int(i64),
    Real(f64),
}
impl Num {
    fn parse(text: &str) -> Option<Num> {
        // f64 would also take things like "inf"
        let first = text.chars().next()?;
        if !(first.is_ascii_digit() || first == '-') {
            return None;
        }
        if let Ok(int) = text.parse() {
            Some(Num::Int(int))
        } else if text.contains('.') {
            text.parse().ok().map(Num::Real)
        } else {
            // an integer too wide for i64 stays as written
            None
        }
    }
    fn real(self) -> f64 {
        match self {
            Num::Int(int) => int as f64,
            Num::Real(real) => real,
        }
    }
}

fn format_real(real: f64) -> Option<String> {
    if real.is_finite() {
        // Debug keeps the trailing .0 on whole numbers, like python does
        Some(format!("{:?}", real))
    } else {
        None
    }
}

/// `l op r` for + - / %, with python's semantics: `/` is true division and
/// `%` takes the sign of the divisor. None if it can't be folded
fn fold(l: Num, op: Operator, r: Num) -> Option<String> {
    use Num::*;
    match (l, op, r) {
        (_, Operator::Divide, _) if r.real() == 0.0 => None,
        (_, Operator::Divide, _) => format_real(l.real() / r.real()),
        (Int(l), Operator::Plus, Int(r)) => l.checked_add(r).map(|v| v.to_string()),
        (Int(l), Operator::Minus, Int(r)) => l.checked_sub(r).map(|v| v.to_string()),
        (Int(l), Operator::Mod, Int(r)) => {
            let m = l.checked_rem(r)?;
            Some(if m != 0 && (m < 0) != (r < 0) { m + r } else { m }.to_string())
        }
        (_, Operator::Plus, _) => format_real(l.real() + r.real()),
        (_, Operator::Minus, _) => format_real(l.real() - r.real()),
        (_, Operator::Mod, _) if r.real() == 0.0 => None,
        (_, Operator::Mod, _) => {
            let (l, r) = (l.real(), r.real());
            let m = l % r;
            format_real(if m != 0.0 && (m < 0.0) != (r < 0.0) { m + r } else { m })
        }
        _ => None,
    }
}

fn strength_reduce(l: Num, r: Num) -> Option<Fragment> {
    match (l, r) {
        (Num::Int(multiplicand), Num::Int(multiplier)) if multiplier >= 0 => {
            let terms = shift_terms(multiplicand, multiplier as u64);
            let text = if terms.is_empty() {
                "0".to_string()
            } else {
                terms.iter().map(ShiftTerm::to_string).collect::<Vec<_>>().join(" + ")
            };
            Some(Fragment { text, atomic: terms.len() <= 1 })
        }
        _ => None,
    }
}

fn lower_operand(operand: &Operand, alias: &str, left: bool) -> Fragment {
    match operand {
        // only the left side of a comparison names a column, on the right
        // it's just a string
        Operand::Column(column) if left => Fragment::atom(format!("{}[{}]", alias, column)),
        Operand::Column(text) | Operand::Number(text) => Fragment::atom(text.clone()),
        Operand::Condition(condition) => lower(condition, alias),
    }
}

fn lower(condition: &Condition, alias: &str) -> Fragment {
    let left = lower_operand(&condition.left, alias, true);
    let right = lower_operand(&condition.right, alias, false);
    let op = condition.op;
    let arithmetic = match op {
        Operator::Plus | Operator::Minus | Operator::Times | Operator::Divide | Operator::Mod => true,
        _ => false,
    };
    if arithmetic {
        if let (Some(l), Some(r)) = (Num::parse(&left.text), Num::parse(&right.text)) {
            let folded = match op {
                Operator::Times => strength_reduce(l, r),
                _ => fold(l, op, r).map(Fragment::atom),
            };
            if let Some(folded) = folded {
                trace!("folded {} {} {} into {}", left.text, op, right.text, folded.text);
                return folded;
            }
        }
        Fragment::atom(format!("({} {} {})", left.wrapped(), target_operator(op), right.wrapped()))
    } else {
        Fragment::atom(format!("({} {} {})", left.text, target_operator(op), right.text))
    }
}

/// The mask expression for `condition` over the dataset bound to `alias`
pub fn compile_filter(condition: &Condition, alias: &str) -> String {
    lower(condition, alias).text
}

#[cfg(test)]
mod test {
    use super::*;

    fn col(name: &str) -> Operand {
        Operand::Column(format!("\"{}\"", name))
    }
    fn num(n: &str) -> Operand {
        Operand::Number(n.to_string())
    }
    fn c(left: Operand, op: Operator, right: Operand) -> Condition {
        Condition { left, op, right }
    }
    fn sub(left: Operand, op: Operator, right: Operand) -> Operand {
        Operand::Condition(Box::new(c(left, op, right)))
    }

    #[test]
    fn shift_terms_follow_set_bits() {
        let terms = shift_terms(2, 5);
        assert_eq!(
            terms,
            vec![ShiftTerm { multiplicand: 2, shift: 0 }, ShiftTerm { multiplicand: 2, shift: 2 }]
        );
        assert_eq!(shift_terms(7, 0), vec![]);
        assert_eq!(shift_terms(3, 8).len(), 1);
    }
    #[test]
    fn strength_reduced_comparison() {
        let cond = c(col("sales"), Operator::GreaterEqual, sub(num("2"), Operator::Times, num("5")));
        assert_eq!(compile_filter(&cond, "a0"), "(a0[\"sales\"] >= (2 << 0) + (2 << 2))");
    }
    #[test]
    fn multiply_by_zero() {
        let cond = c(col("x"), Operator::Equal, sub(num("9"), Operator::Times, num("0")));
        assert_eq!(compile_filter(&cond, "t"), "(t[\"x\"] == 0)");
    }
    #[test]
    fn operators_are_translated() {
        let cond = c(col("a"), Operator::NotEqual, col("b"));
        assert_eq!(compile_filter(&cond, "a0"), "(a0[\"a\"] != \"b\")");
        let cond = c(col("a"), Operator::Equal, num("3"));
        assert_eq!(compile_filter(&cond, "a0"), "(a0[\"a\"] == 3)");
    }
    #[test]
    fn constant_folding() {
        let folded = |op, l: &str, r: &str| compile_filter(&c(num(l), op, num(r)), "a0");
        assert_eq!(folded(Operator::Plus, "2", "3"), "5");
        assert_eq!(folded(Operator::Minus, "2", "3"), "-1");
        assert_eq!(folded(Operator::Divide, "10", "4"), "2.5");
        assert_eq!(folded(Operator::Divide, "4", "2"), "2.0");
        assert_eq!(folded(Operator::Mod, "7", "3"), "1");
        // divisor's sign wins
        assert_eq!(folded(Operator::Mod, "-7", "3"), "2");
    }
    #[test]
    fn nested_folding() {
        // 10 - (1 - 3)
        let cond = c(num("10"), Operator::Minus, sub(num("1"), Operator::Minus, num("3")));
        assert_eq!(compile_filter(&cond, "a0"), "12");
        // (10 / 4) * 2 has a real multiplicand, so it stays a product
        let cond = c(sub(num("10"), Operator::Divide, num("4")), Operator::Times, num("2"));
        assert_eq!(compile_filter(&cond, "a0"), "(2.5 * 2)");
    }
    #[test]
    fn unfoldable_stays_parenthesized() {
        let cond = c(num("1"), Operator::Divide, num("0"));
        assert_eq!(compile_filter(&cond, "a0"), "(1 / 0)");
        let cond = c(col("a"), Operator::Plus, num("2"));
        assert_eq!(compile_filter(&cond, "a0"), "(a0[\"a\"] + 2)");
        let cond = c(num("3"), Operator::Times, sub(num("0"), Operator::Minus, num("2")));
        assert_eq!(compile_filter(&cond, "a0"), "(3 * -2)");
        let cond = c(num("9223372036854775807"), Operator::Plus, num("1"));
        assert_eq!(compile_filter(&cond, "a0"), "(9223372036854775807 + 1)");
    }
    #[test]
    fn oversized_integers_are_not_folded() {
        let cond = c(num("99999999999999999999"), Operator::Plus, num("1"));
        assert_eq!(compile_filter(&cond, "a0"), "(99999999999999999999 + 1)");
        let cond = c(num("1"), Operator::Divide, num("99999999999999999999"));
        assert_eq!(compile_filter(&cond, "a0"), "(1 / 99999999999999999999)");
        // a real still folds
        let cond = c(num("1.5"), Operator::Plus, num("1"));
        assert_eq!(compile_filter(&cond, "a0"), "2.5");
    }
    #[test]
    fn shift_sums_get_wrapped_in_arithmetic() {
        // (a + 2*3) keeps the sum together
        let cond = c(col("a"), Operator::Plus, sub(num("2"), Operator::Times, num("3")));
        assert_eq!(compile_filter(&cond, "a0"), "(a0[\"a\"] + ((2 << 0) + (2 << 1)))");
    }
    #[test]
    fn connectors_keep_shape() {
        let cond = c(
            sub(col("a"), Operator::Greater, num("1")),
            Operator::And,
            sub(sub(col("b"), Operator::Less, num("2")), Operator::Or, sub(col("c"), Operator::Equal, col("x"))),
        );
        assert_eq!(
            compile_filter(&cond, "w"),
            "((w[\"a\"] > 1) & ((w[\"b\"] < 2) | (w[\"c\"] == \"x\")))"
        );
    }
}
