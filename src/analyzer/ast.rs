//! This AST describes a validated IPPcode22 program.
//!
//! Instructions are kept in source order and numbered from 1.
//! The program serializes to the XML representation consumed by the interpreter:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <program language="IPPcode22">
//!   <instruction order="1" opcode="MOVE">
//!     <arg1 type="var">GF@x</arg1>
//!     <arg2 type="string">a\032b</arg2>
//!   </instruction>
//! </program>
//! ```
use std::borrow::Cow;
use std::fmt::{self, Write as FmtWrite};
use std::io::Write;
use term_grid::{Cell, Direction, Filling, Grid, GridOptions};
use super::error::ParseError;

pub const LANGUAGE: &str = "IPPcode22";

/// Variable storage scope.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Frame {
    Global,
    Local,
    Temporary,
}

impl Frame {
    pub fn prefix(&self) -> &'static str {
        match self {
            Frame::Global => "GF",
            Frame::Local => "LF",
            Frame::Temporary => "TF",
        }
    }
}

impl std::str::FromStr for Frame {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GF" => Ok(Frame::Global),
            "LF" => Ok(Frame::Local),
            "TF" => Ok(Frame::Temporary),
            _ => Err(()),
        }
    }
}

/// Type names accepted by `READ`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TypeName {
    Int,
    String,
    Bool,
}

impl TypeName {
    pub fn name(&self) -> &'static str {
        match self {
            TypeName::Int => "int",
            TypeName::String => "string",
            TypeName::Bool => "bool",
        }
    }
}

impl std::str::FromStr for TypeName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(TypeName::Int),
            "string" => Ok(TypeName::String),
            "bool" => Ok(TypeName::Bool),
            _ => Err(()),
        }
    }
}

/// A classified operand.
/// Integer and string literals keep their source text: the interpreter decodes them.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Argument {
    Var { frame: Frame, name: String },
    Int(String),
    Str(String),
    Bool(bool),
    Nil,
    Label(String),
    Type(TypeName),
}

impl Argument {
    /// The value of the `type` attribute in the XML output.
    pub fn kind(&self) -> &'static str {
        match self {
            Argument::Var { .. } => "var",
            Argument::Int(_) => "int",
            Argument::Str(_) => "string",
            Argument::Bool(_) => "bool",
            Argument::Nil => "nil",
            Argument::Label(_) => "label",
            Argument::Type(_) => "type",
        }
    }

    /// The element content in the XML output, before escaping.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Argument::Var { frame, name } => Cow::Owned(format!("{}@{}", frame.prefix(), name)),
            Argument::Int(lit) | Argument::Str(lit) | Argument::Label(lit) => Cow::Borrowed(lit.as_str()),
            Argument::Bool(true) => Cow::Borrowed("true"),
            Argument::Bool(false) => Cow::Borrowed("false"),
            Argument::Nil => Cow::Borrowed("nil"),
            Argument::Type(t) => Cow::Borrowed(t.name()),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Argument::Var { .. } | Argument::Label(_) | Argument::Type(_) => write!(f, "{}", self.text()),
            _ => write!(f, "{}@{}", self.kind(), self.text()),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub order: usize,
    pub opcode: &'static str,
    pub args: Vec<Argument>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for arg in self.args.iter() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// An ordered list of accepted instructions.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Self {
        Program { instructions: Vec::with_capacity(256) }
    }

    /// Appends an instruction, numbering it after the last one.
    pub fn push(&mut self, opcode: &'static str, args: Vec<Argument>) -> &Instruction {
        let order = self.instructions.len() + 1;
        self.instructions.push(Instruction { order, opcode, args });
        &self.instructions[order - 1]
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// Renders the whole XML document.
    pub fn to_xml(&self) -> Result<String, fmt::Error> {
        let mut out = String::with_capacity(64 + self.instructions.len() * 96);
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;

        if self.is_empty() {
            writeln!(out, r#"<program language="{}"/>"#, LANGUAGE)?;
            return Ok(out);
        }

        writeln!(out, r#"<program language="{}">"#, LANGUAGE)?;
        for ins in self.instructions.iter() {
            if ins.args.is_empty() {
                writeln!(out, r#"  <instruction order="{}" opcode="{}"/>"#, ins.order, ins.opcode)?;
                continue;
            }

            writeln!(out, r#"  <instruction order="{}" opcode="{}">"#, ins.order, ins.opcode)?;
            for (idx, arg) in ins.args.iter().enumerate() {
                writeln!(
                    out,
                    r#"    <arg{n} type="{}">{}</arg{n}>"#,
                    arg.kind(),
                    escape(&arg.text()),
                    n = idx + 1
                )?;
            }
            writeln!(out, "  </instruction>")?;
        }
        writeln!(out, "</program>")?;
        Ok(out)
    }

    /// Serializes the program in one write once it is complete.
    pub fn write_xml<W: Write>(&self, writer: &mut W) -> Result<(), ParseError> {
        let doc = self.to_xml()?;
        writer
            .write_all(doc.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| ParseError::Output(e.to_string()))
    }

    /// A column listing of the program for debug output.
    pub fn listing(&self) -> String {
        let mut grid = Grid::new(GridOptions {
            filling:   Filling::Spaces(1),
            direction: Direction::LeftToRight,
        });

        for ins in self.iter() {
            grid.add(Cell::from(format!("{:>4}:", ins.order)));
            grid.add(Cell::from(ins.opcode.to_string()));
            grid.add(Cell::from(
                ins.args
                    .iter()
                    .map(|a| format!("[{}] {}", a.kind(), a.text()))
                    .collect::<Vec<_>>()
                    .join(", "),
            ));
        }

        grid.fit_into_columns(3).to_string()
    }
}

/// Escapes the characters XML does not allow verbatim in content or attributes.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
