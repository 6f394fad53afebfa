//! The Parser module reads source lines through the lexer, checks each
//! instruction against the registry and turns it into the AST.
use std::io::BufRead;
use regex::Regex;
use super::ast::{Argument, Frame, Program, TypeName};
use super::error::ParseError;
use super::lexer::{self, Line, SourceReader};
use super::registry::{self, ArgClass};

lazy_static! {
    static ref VARIABLE: Regex =
        Regex::new(r"^(GF|LF|TF)@([A-Za-z_\-$&%*!?][A-Za-z0-9_\-$&%*!?]*)$").unwrap();
    static ref LABEL: Regex =
        Regex::new(r"^[A-Za-z_\-$&%*!?][A-Za-z0-9_\-$&%*!?]*$").unwrap();
    static ref INT: Regex = Regex::new(r"^[+-]?[0-9]+$").unwrap();
    // No whitespace, control characters, `#` or lone backslash.
    // Escapes are a backslash and three digits.
    static ref STRING: Regex = Regex::new(r"^(?:[^\s\p{Cc}#\\]|\\[0-9]{3})*$").unwrap();
}

pub const NIL: &str = "nil@nil";

/// `FRAME@name`
pub fn variable(tok: &str) -> Option<Argument> {
    let caps = VARIABLE.captures(tok)?;
    let frame: Frame = caps[1].parse().ok()?;
    Some(Argument::Var { frame, name: caps[2].to_owned() })
}

pub fn label(tok: &str) -> Option<Argument> {
    if LABEL.is_match(tok) {
        Some(Argument::Label(tok.to_owned()))
    } else {
        None
    }
}

pub fn type_name(tok: &str) -> Option<Argument> {
    tok.parse::<TypeName>().ok().map(Argument::Type)
}

/// A literal of the form `int@..`, `string@..`, `bool@..` or `nil@nil`.
pub fn constant(tok: &str) -> Option<Argument> {
    if let Some(lit) = tok.strip_prefix("int@") {
        return if INT.is_match(lit) { Some(Argument::Int(lit.to_owned())) } else { None };
    }
    if let Some(lit) = tok.strip_prefix("string@") {
        return if STRING.is_match(lit) { Some(Argument::Str(lit.to_owned())) } else { None };
    }
    if let Some(lit) = tok.strip_prefix("bool@") {
        return match lit {
            "true" => Some(Argument::Bool(true)),
            "false" => Some(Argument::Bool(false)),
            _ => None,
        };
    }

    if tok == NIL {
        Some(Argument::Nil)
    } else {
        None
    }
}

/// A variable or a constant. A token that reads as a variable is never tried as a constant.
pub fn symbol(tok: &str) -> Option<Argument> {
    variable(tok).or_else(|| constant(tok))
}

pub fn classify(class: ArgClass, tok: &str) -> Option<Argument> {
    match class {
        ArgClass::Var => variable(tok),
        ArgClass::Symb => symbol(tok),
        ArgClass::Label => label(tok),
        ArgClass::Type => type_name(tok),
    }
}

/// Checks an instruction line against its opcode's signature.
/// Operand count is checked before any operand is classified.
pub fn validate(line: &Line) -> Result<(&'static str, Vec<Argument>), ParseError> {
    let (opcode, signature) = registry::lookup(line.opcode).ok_or_else(|| {
        ParseError::UnknownOpcode { line: line.number, token: line.opcode.to_owned() }
    })?;

    if line.args.len() != signature.arity() {
        return Err(ParseError::Arity {
            line: line.number,
            opcode: opcode.to_owned(),
            expected: signature.arity(),
            found: line.args.len(),
        });
    }

    let classes = signature.classes();
    let mut args = Vec::with_capacity(classes.len());
    for (idx, (class, tok)) in classes.iter().zip(line.args.iter()).enumerate() {
        match classify(*class, tok) {
            Some(arg) => args.push(arg),
            None => {
                return Err(ParseError::ArgumentType {
                    line: line.number,
                    opcode: opcode.to_owned(),
                    position: idx + 1,
                    token: (*tok).to_owned(),
                    expected: class.name(),
                })
            }
        }
    }

    Ok((opcode, args))
}

pub struct Parser<R: BufRead> {
    source: SourceReader<R>,
    program: Program,
}

impl<R: BufRead> Parser<R> {
    pub fn new(reader: R) -> Self {
        Parser { source: SourceReader::new(reader), program: Program::new() }
    }

    /// Run the parser, consuming itself and returning the program.
    /// Stops at the first error without reading any further input.
    pub fn run(mut self) -> Result<Program, ParseError> {
        self.source.expect_header()?;

        while let Some(raw) = self.source.next_line()? {
            let line = match lexer::tokenize_line(&raw, self.source.line()) {
                Some(line) => line,
                None => continue,
            };

            let (opcode, args) = validate(&line)?;
            let ins = self.program.push(opcode, args);
            debug!("line {}: accepted #{} {}", line.number, ins.order, ins);
        }

        info!("parsed {} instruction(s) from {} line(s)", self.program.len(), self.source.line());
        Ok(self.program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<Program, ParseError> {
        Parser::new(src.as_bytes()).run()
    }

    fn line<'a>(opcode: &'a str, args: &[&'a str]) -> Line<'a> {
        Line { number: 1, opcode, args: args.to_vec() }
    }

    #[test]
    fn test_variable() {
        assert_eq!(
            variable("GF@x"),
            Some(Argument::Var { frame: Frame::Global, name: "x".to_owned() })
        );
        assert_eq!(
            variable("LF@_a-b$c&d%e*f!g?h1"),
            Some(Argument::Var { frame: Frame::Local, name: "_a-b$c&d%e*f!g?h1".to_owned() })
        );
        assert!(variable("TF@?").is_some());

        assert_eq!(variable("GF@"), None);
        assert_eq!(variable("GF@1x"), None);
        assert_eq!(variable("gf@x"), None);
        assert_eq!(variable("XF@x"), None);
        assert_eq!(variable("x"), None);
        assert_eq!(variable("GF@x@y"), None);
        assert_eq!(variable("GF@a.b"), None);
        assert_eq!(variable("int@5"), None);
    }

    #[test]
    fn test_label() {
        assert_eq!(label("end"), Some(Argument::Label("end".to_owned())));
        assert!(label("_loop-2").is_some());
        assert!(label("%$&*!?").is_some());

        assert_eq!(label(""), None);
        assert_eq!(label("2start"), None);
        assert_eq!(label("GF@x"), None);
        assert_eq!(label("a b"), None);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name("int"), Some(Argument::Type(TypeName::Int)));
        assert_eq!(type_name("string"), Some(Argument::Type(TypeName::String)));
        assert_eq!(type_name("bool"), Some(Argument::Type(TypeName::Bool)));
        assert_eq!(type_name("nil"), None);
        assert_eq!(type_name("Int"), None);
        assert_eq!(type_name("int@5"), None);
    }

    #[test]
    fn test_int_constant() {
        assert_eq!(constant("int@0"), Some(Argument::Int("0".to_owned())));
        assert_eq!(constant("int@-17"), Some(Argument::Int("-17".to_owned())));
        assert_eq!(constant("int@+42"), Some(Argument::Int("+42".to_owned())));

        assert_eq!(constant("int@"), None);
        assert_eq!(constant("int@abc"), None);
        assert_eq!(constant("int@1.5"), None);
        assert_eq!(constant("int@--1"), None);
        assert_eq!(constant("int@+"), None);
        assert_eq!(constant("INT@5"), None);
    }

    #[test]
    fn test_string_constant() {
        assert_eq!(constant("string@"), Some(Argument::Str(String::new())));
        assert_eq!(constant("string@hello"), Some(Argument::Str("hello".to_owned())));
        assert_eq!(constant(r"string@a\065b"), Some(Argument::Str(r"a\065b".to_owned())));
        assert!(constant(r"string@\032\010").is_some());
        assert!(constant("string@<tag>&'\"").is_some());
        assert!(constant("string@příliš").is_some());
        assert!(constant("string@a@b").is_some());

        assert_eq!(constant(r"string@a\6b"), None);
        assert_eq!(constant(r"string@a\65"), None);
        assert_eq!(constant(r"string@\"), None);
        assert_eq!(constant(r"string@a\x41"), None);
        assert_eq!(constant("string@a#b"), None);
        assert_eq!(constant("string@a b"), None);
        assert_eq!(constant("string@a\tb"), None);
        assert_eq!(constant("string@a\u{1}b"), None);
        assert_eq!(constant("string@\u{1F}"), None);
        assert_eq!(constant("string@x\u{7F}"), None);
        assert_eq!(constant("string@\u{0}"), None);
        assert_eq!(constant(r"string@\001\031\127"), Some(Argument::Str(r"\001\031\127".to_owned())));
    }

    #[test]
    fn test_bool_and_nil_constant() {
        assert_eq!(constant("bool@true"), Some(Argument::Bool(true)));
        assert_eq!(constant("bool@false"), Some(Argument::Bool(false)));
        assert_eq!(constant("bool@TRUE"), None);
        assert_eq!(constant("bool@1"), None);

        assert_eq!(constant("nil@nil"), Some(Argument::Nil));
        assert_eq!(constant("nil@"), None);
        assert_eq!(constant("nil@NIL"), None);
        assert_eq!(constant("nil"), None);
        assert_eq!(constant("float@1.0"), None);
    }

    #[test]
    fn test_symbol_prefers_variable() {
        assert_eq!(
            symbol("TF@tmp"),
            Some(Argument::Var { frame: Frame::Temporary, name: "tmp".to_owned() })
        );
        assert_eq!(symbol("int@3"), Some(Argument::Int("3".to_owned())));
        assert_eq!(symbol("end"), None);
        assert_eq!(symbol("string"), None);
    }

    #[test]
    fn test_validate() {
        let (op, args) = validate(&line("move", &["GF@x", "int@5"])).unwrap();
        assert_eq!(op, "MOVE");
        assert_eq!(
            args,
            vec![
                Argument::Var { frame: Frame::Global, name: "x".to_owned() },
                Argument::Int("5".to_owned()),
            ]
        );

        let (op, args) = validate(&line("Read", &["LF@in", "bool"])).unwrap();
        assert_eq!(op, "READ");
        assert_eq!(args[1], Argument::Type(TypeName::Bool));

        let (op, args) = validate(&line("JUMPIFEQ", &["end", "GF@a", "nil@nil"])).unwrap();
        assert_eq!(op, "JUMPIFEQ");
        assert_eq!(args[0], Argument::Label("end".to_owned()));
        assert_eq!(args[2], Argument::Nil);

        let (op, args) = validate(&line("return", &[])).unwrap();
        assert_eq!(op, "RETURN");
        assert!(args.is_empty());
    }

    #[test]
    fn test_validate_errors() {
        assert_eq!(
            validate(&line("Frob", &[])),
            Err(ParseError::UnknownOpcode { line: 1, token: "Frob".to_owned() })
        );
        assert_eq!(
            validate(&line("DEFVAR", &["GF@x", "TF@y"])),
            Err(ParseError::Arity { line: 1, opcode: "DEFVAR".to_owned(), expected: 1, found: 2 })
        );
        assert_eq!(
            validate(&line("ADD", &["GF@x", "int@1"])),
            Err(ParseError::Arity { line: 1, opcode: "ADD".to_owned(), expected: 3, found: 2 })
        );
        assert_eq!(
            validate(&line("MOVE", &["GF@x", "int@abc"])),
            Err(ParseError::ArgumentType {
                line: 1,
                opcode: "MOVE".to_owned(),
                position: 2,
                token: "int@abc".to_owned(),
                expected: "symbol",
            })
        );
        // A constant where a variable is required.
        assert!(matches!(
            validate(&line("MOVE", &["int@1", "GF@x"])),
            Err(ParseError::ArgumentType { position: 1, .. })
        ));
        // The first bad operand is the one reported.
        assert!(matches!(
            validate(&line("JUMPIFNEQ", &["1bad", "bad", "GF@y"])),
            Err(ParseError::ArgumentType { position: 1, .. })
        ));
        assert!(matches!(
            validate(&line("CALL", &["GF@x"])),
            Err(ParseError::ArgumentType { position: 1, expected: "label", .. })
        ));
        assert!(matches!(
            validate(&line("READ", &["GF@x", "nil"])),
            Err(ParseError::ArgumentType { position: 2, expected: "type", .. })
        ));
    }

    #[test]
    fn test_run_numbers_instructions() {
        let program = parse(
            "# prologue\n\
             .IPPcode22\n\
             \n\
             DEFVAR GF@counter # comment\n\
             # comment only\n\
             move GF@counter int@0\n\
             label loop\n\
             ADD GF@counter GF@counter int@1\n\
             JUMPIFNEQ loop GF@counter int@10\n\
             WRITE GF@counter\n",
        )
        .unwrap();

        let orders: Vec<usize> = program.iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6]);
        let opcodes: Vec<&str> = program.iter().map(|i| i.opcode).collect();
        assert_eq!(opcodes, vec!["DEFVAR", "MOVE", "LABEL", "ADD", "JUMPIFNEQ", "WRITE"]);
        for ins in program.iter() {
            assert_eq!(ins.args.len(), registry::lookup(ins.opcode).unwrap().1.arity());
        }
    }

    #[test]
    fn test_run_header_only() {
        assert!(parse(".IPPcode22\n").unwrap().is_empty());
        assert!(parse(".ippCODE22 # nothing else").unwrap().is_empty());
    }

    #[test]
    fn test_run_scenarios() {
        let program = parse(".IPPcode22\nCREATEFRAME\n").unwrap();
        assert_eq!(program.len(), 1);
        let ins = program.iter().next().unwrap();
        assert_eq!((ins.order, ins.opcode, ins.args.len()), (1, "CREATEFRAME", 0));

        assert_eq!(parse("CREATEFRAME\n").unwrap_err().exit_code(), 21);
        assert_eq!(parse("").unwrap_err().exit_code(), 21);
        assert_eq!(parse(".IPPcode22\nDEFVAR GF@x TF@y\n").unwrap_err().exit_code(), 23);
        assert_eq!(parse(".IPPcode22\nMOVE GF@x int@abc\n").unwrap_err().exit_code(), 23);
        assert_eq!(parse(".IPPcode22\nFROB\n").unwrap_err().exit_code(), 22);
        assert!(parse(".IPPcode22\nWRITE string@a\\065b\n").is_ok());
        assert_eq!(parse(".IPPcode22\nWRITE string@a\\6b\n").unwrap_err().exit_code(), 23);
    }

    #[test]
    fn test_run_rejects_control_characters_in_strings() {
        let err = parse(".IPPcode22\nWRITE string@a\u{1}b\n").unwrap_err();
        assert!(matches!(err, ParseError::ArgumentType { line: 2, position: 1, .. }));
        assert_eq!(parse(".IPPcode22\nWRITE string@x\u{7F}\n").unwrap_err().exit_code(), 23);
    }

    #[test]
    fn test_run_missing_header_at_end_of_input() {
        assert_eq!(
            parse("# only a comment\n").unwrap_err(),
            ParseError::MissingHeader { expected: lexer::HEADER }
        );
    }

    #[test]
    fn test_run_reports_line_numbers() {
        assert_eq!(
            parse("\n.IPPcode22\nCREATEFRAME\n\nPUSHS\n").unwrap_err(),
            ParseError::Arity { line: 5, opcode: "PUSHS".to_owned(), expected: 1, found: 0 }
        );
    }

    #[test]
    fn test_run_fails_fast() {
        // The unknown opcode comes first, so the later arity error is never seen.
        assert_eq!(
            parse(".IPPcode22\nFROB GF@x\nDEFVAR\n").unwrap_err().exit_code(),
            22
        );
        // A second header is just an unknown opcode.
        assert_eq!(parse(".IPPcode22\n.IPPcode22\n").unwrap_err().exit_code(), 22);
    }

    #[test]
    fn test_run_extra_operands_glue_into_third() {
        let err = parse(".IPPcode22\nADD GF@x GF@y GF@z GF@w\n").unwrap_err();
        assert!(matches!(err, ParseError::ArgumentType { position: 3, .. }));
    }
}
