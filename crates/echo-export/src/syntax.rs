//! Echo scene-description syntax
//!
//! A small tree for the subset of the echo grammar the exporter emits:
//!
//! ```text
//! :scene = new Scene
//! {
//!     :materialC = new Matte {.Albedo = new Pure("hdr(1,0,0,1)")}
//!     .Add(new MeshEntity {.Mesh = new Mesh("./geometries/C.ply") .Material = link :materialC})
//! }
//! ```
//!
//! Values are either quoted strings, links to named declarations, or
//! bare `new Kind` constructions. Nothing else is ever quoted, so a
//! construction can never be mistaken for a string value.

use std::fmt::{self, Write};

/// Indentation of statements inside a top-level declaration body
const INDENT: &str = "    ";

/// Right-hand side of an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Double-quoted string, also used for numbers and numeric tuples
    Quoted(String),
    /// Reference to a named declaration (`link :name`)
    Link(String),
    /// Bare type construction
    Construct(Construct),
}

impl Value {
    pub fn quoted(text: impl Into<String>) -> Self {
        Value::Quoted(text.into())
    }

    pub fn link(name: impl Into<String>) -> Self {
        Value::Link(name.into())
    }
}

impl From<Construct> for Value {
    fn from(construct: Construct) -> Self {
        Value::Construct(construct)
    }
}

/// `new Kind("arg", ...) { statements }`
#[derive(Debug, Clone, PartialEq)]
pub struct Construct {
    pub kind: String,
    pub args: Vec<String>,
    pub body: Vec<Statement>,
}

impl Construct {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            args: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Append a quoted constructor argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a `.Field = value` statement
    pub fn assign(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.push(Statement::Assign {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn push(&mut self, statement: Statement) {
        self.body.push(statement);
    }

    fn write_head(&self, out: &mut String) -> fmt::Result {
        write!(out, "new {}", self.kind)?;
        if !self.args.is_empty() {
            out.push('(');
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_quoted(out, arg)?;
            }
            out.push(')');
        }
        Ok(())
    }

    /// Render on a single line
    fn write_inline(&self, out: &mut String) -> fmt::Result {
        self.write_head(out)?;
        if !self.body.is_empty() {
            out.push_str(" {");
            for (i, statement) in self.body.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                statement.write_to(out)?;
            }
            out.push('}');
        }
        Ok(())
    }
}

/// One statement inside a construction body
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `.Field = value`
    Assign { field: String, value: Value },
    /// `.Add(new Kind ...)`
    Add(Construct),
    /// `:name = new Kind ...`
    Declare(Declaration),
}

impl Statement {
    fn write_to(&self, out: &mut String) -> fmt::Result {
        match self {
            Statement::Assign { field, value } => {
                write!(out, ".{} = ", field)?;
                write_value(out, value)
            }
            Statement::Add(construct) => {
                out.push_str(".Add(");
                construct.write_inline(out)?;
                out.push(')');
                Ok(())
            }
            Statement::Declare(declaration) => {
                write!(out, ":{} = ", declaration.name)?;
                declaration.value.write_inline(out)
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_to(&mut out)?;
        f.write_str(&out)
    }
}

/// Named declaration `:name = new Kind { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: Construct,
}

impl Declaration {
    pub fn new(name: impl Into<String>, value: Construct) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Render as a top-level block, one statement per line
    pub fn to_block(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_block(&mut out);
        out
    }

    fn write_block(&self, out: &mut String) -> fmt::Result {
        write!(out, ":{} = ", self.name)?;
        self.value.write_head(out)?;
        out.push_str("\n{\n");
        for statement in &self.value.body {
            out.push_str(INDENT);
            statement.write_to(out)?;
            out.push('\n');
        }
        out.push_str("}\n");
        Ok(())
    }
}

fn write_value(out: &mut String, value: &Value) -> fmt::Result {
    match value {
        Value::Quoted(text) => write_quoted(out, text),
        Value::Link(name) => write!(out, "link :{}", name),
        Value::Construct(construct) => construct.write_inline(out),
    }
}

fn write_quoted(out: &mut String, text: &str) -> fmt::Result {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    Ok(())
}

/// Decimal form of a number: integral values lose the fraction, `-0` becomes `0`
pub fn number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Space-separated numeric tuple, e.g. `"1 2.5 0"`
pub fn tuple(values: &[f64]) -> String {
    values.iter().map(|v| number(*v)).collect::<Vec<_>>().join(" ")
}

/// Space-separated integer tuple
pub fn int_tuple(values: &[i64]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

/// High dynamic range color literal, e.g. `hdr(1,0,0,1)`
pub fn hdr(channels: &[f64]) -> String {
    let parts: Vec<String> = channels.iter().map(|c| number(*c)).collect();
    format!("hdr({})", parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(1.0), "1");
        assert_eq!(number(-0.0), "0");
        assert_eq!(number(0.5), "0.5");
        assert_eq!(number(-2.25), "-2.25");
        assert_eq!(number(1920.0), "1920");
    }

    #[test]
    fn test_tuples() {
        assert_eq!(tuple(&[0.0, 5.0, -1.5]), "0 5 -1.5");
        assert_eq!(int_tuple(&[90, 0, 180]), "90 0 180");
        assert_eq!(hdr(&[1.0, 0.0, 0.0, 1.0]), "hdr(1,0,0,1)");
    }

    #[test]
    fn test_inline_construct() {
        let statement = Statement::Declare(Declaration::new(
            "materialCube1",
            Construct::new("Matte").assign("Albedo", Construct::new("Pure").arg("hdr(1,0,0,1)")),
        ));

        assert_eq!(
            statement.to_string(),
            r#":materialCube1 = new Matte {.Albedo = new Pure("hdr(1,0,0,1)")}"#
        );
    }

    #[test]
    fn test_bare_construct_is_not_quoted() {
        let statement = Statement::Assign {
            field: "Evaluator".into(),
            value: Construct::new("PathTracedEvaluator").into(),
        };
        assert_eq!(statement.to_string(), ".Evaluator = new PathTracedEvaluator");

        let statement = Statement::Assign {
            field: "MaxEpoch".into(),
            value: Value::quoted("20"),
        };
        assert_eq!(statement.to_string(), r#".MaxEpoch = "20""#);
    }

    #[test]
    fn test_add_and_link() {
        let statement = Statement::Add(
            Construct::new("MeshEntity")
                .assign("Mesh", Construct::new("Mesh").arg("./geometries/A.ply"))
                .assign("Material", Value::link("materialA")),
        );

        assert_eq!(
            statement.to_string(),
            concat!(
                r#".Add(new MeshEntity {.Mesh = new Mesh("./geometries/A.ply") "#,
                r#".Material = link :materialA})"#,
            )
        );
    }

    #[test]
    fn test_block_rendering() {
        let declaration = Declaration::new(
            "profile",
            Construct::new("EvaluationProfile")
                .assign("MinEpoch", Value::quoted("1"))
                .assign("MaxEpoch", Value::quoted("20")),
        );

        assert_eq!(
            declaration.to_block(),
            concat!(
                ":profile = new EvaluationProfile\n{\n",
                "    .MinEpoch = \"1\"\n",
                "    .MaxEpoch = \"20\"\n}\n",
            )
        );
    }

    #[test]
    fn test_quoted_escaping() {
        let statement = Statement::Assign {
            field: "Path".into(),
            value: Value::quoted(r#"a"b\c"#),
        };
        assert_eq!(statement.to_string(), r#".Path = "a\"b\\c""#);
    }
}
