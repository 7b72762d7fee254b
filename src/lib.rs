// all roads lead to lib.rs

#[macro_use]
extern crate log;

pub mod intermediates {
    pub mod ast;
    pub mod target;
    pub mod token;
}
pub mod passes;
mod span;

pub use intermediates::{ast, target, token::*};
pub use passes::{LexError, ParseError};
pub use span::Span;

#[derive(PartialEq, Clone, Debug)]
pub enum CompileError {
    /// everything the scanner found, in source order
    Lexical(Vec<LexError>),
    /// the first thing the parser tripped on
    Syntax(ParseError),
}
impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CompileError::Lexical(errors) => {
                write!(f, "Lexical Errors Found:")?;
                for error in errors {
                    write!(f, "\n{}", error)?;
                }
                Ok(())
            }
            CompileError::Syntax(error) => write!(f, "Syntax Error: {}", error),
        }
    }
}
impl std::error::Error for CompileError {}
impl From<ParseError> for CompileError {
    fn from(error: ParseError) -> Self {
        CompileError::Syntax(error)
    }
}

/// Only scans, for looking at the tokens. Lexical errors win over tokens
pub fn tokenize(text: &str) -> Result<Vec<Token>, CompileError> {
    let (tokens, errors) = passes::scan(text);
    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(CompileError::Lexical(errors))
    }
}

/// Scans and parses, stopping short of generating anything
pub fn syntax_tree(text: &str) -> Result<ast::Program, CompileError> {
    Ok(passes::parse(tokenize(text)?)?)
}

/// Source in, optimized pandas program out. A program with lexical errors is
/// never parsed, so a failure is either every lexical error or one syntax
/// error, never both
pub fn compile(text: &str) -> Result<String, CompileError> {
    let program = syntax_tree(text)?;
    let generated = passes::generate(&program);
    Ok(passes::optimize(&generated))
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn lexical_errors_stop_everything() {
        let err = compile("LOAD(\"s.csv\") @ 02;").expect_err("should not compile");
        assert_eq!(
            err.to_string(),
            "Lexical Errors Found:\nUnrecognized character: @\nInvalid number with leading zero(s): 02"
        );
    }
    #[test]
    fn syntax_error() {
        let err = compile("CREATE(\"x.csv\")").expect_err("should not compile");
        assert_eq!(err.to_string(), "Syntax Error: Expected separator ; but found nothing");
    }
    #[test]
    fn empty_program() {
        assert_eq!(compile(""), Ok(String::new()));
    }
    #[test]
    fn plain_display_keeps_its_read() {
        assert_eq!(
            compile(r#"LOAD("s.csv", header = true); DISPLAY("goods");"#),
            Ok("from pathlib import Path\nimport pandas as pd\n\n\
                a0 = pd.read_csv(\"s.csv\", header=[0])\n\
                a4 = (a0)\n\
                print(a4.loc[:, [\"goods\"]])\n\
                print()\n"
                .to_string())
        );
    }
    #[test]
    fn shared_read_survives_through_its_alias() {
        assert_eq!(
            compile(
                r#"LOAD("s.csv", tag = "x", header = true);
                LOAD("s.csv", tag = "y", header = true);
                PRINT("m", SUM("v"), tag = "y");"#
            ),
            Ok("from pathlib import Path\nimport pandas as pd\n\n\
                x = pd.read_csv(\"s.csv\", header=[0])\n\
                y = x\n\
                print(\"m\", y[\"v\"].sum())\n"
                .to_string())
        );
    }
    #[test]
    fn retagged_alias_is_not_shared() {
        assert_eq!(
            compile(
                r#"LOAD("s.csv", tag = "x", header = true);
                LOAD("t.csv", tag = "x", header = true);
                LOAD("s.csv", tag = "y", header = true);
                PRINT("m", SUM("v"), tag = "y");"#
            ),
            Ok("from pathlib import Path\nimport pandas as pd\n\n\
                y = pd.read_csv(\"s.csv\", header=[0])\n\
                print(\"m\", y[\"v\"].sum())\n"
                .to_string())
        );
    }
    #[test]
    fn batch_merge() {
        let out = compile(
            r#"LOAD("s.csv", tag = "batch1", header = true);
            LOAD("s.csv", tag = "batch2", header = true);
            MERGE("batch1", "batch2", save = true, path = "out.csv");"#,
        );
        assert_eq!(
            out,
            Ok("from pathlib import Path\nimport pandas as pd\n\n\
                batch1 = pd.read_csv(\"s.csv\", header=[0])\n\
                batch2 = batch1\n\
                pd.concat([batch1, batch2]).to_csv(\"out.csv\", index=False)\n"
                .to_string())
        );
    }
}
