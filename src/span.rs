/// a span is simply a location in the program, from the beginning (lo) to
/// end (hi) represented as (line, col). both are 1-based. every token gets
/// one so that syntax errors can point somewhere useful
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct Span {
    pub lo: (usize, usize),
    pub hi: (usize, usize),
}
impl Span {
    pub fn new() -> Self {
        Self::default()
    }
    /// a span covering a single run on one line
    pub fn on_line(line: usize, col: usize, len: usize) -> Self {
        Span { lo: (line, col), hi: (line, col + len) }
    }
    /// This is set as in "a set of berries" not "set x to 2". taking a list
    /// of spans, find the span spanning ALL of them. None if given nothing
    pub fn set(spans: &[Span]) -> Option<Span> {
        let first = spans.first()?;
        let mut lo = first.lo;
        let mut hi = first.hi;
        for span in &spans[1..] {
            // if lower, go lower
            if span.lo < lo {
                lo = span.lo;
            }
            // if higher go higher
            if span.hi > hi {
                hi = span.hi;
            }
        }
        Some(Span { lo, hi })
    }
}
impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if *self == Span::new() {
            write!(f, "internal")
        } else {
            write!(f, "{}:{}", self.lo.0, self.lo.1)
        }
    }
}
