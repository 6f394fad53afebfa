//! Every way the analyzer can stop, and the exit code each one maps to.
use thiserror::Error;

pub const EXIT_OK: i32 = 0;
pub const EXIT_PARAM: i32 = 10;
pub const EXIT_INPUT: i32 = 11;
pub const EXIT_OUTPUT: i32 = 12;
pub const EXIT_HEADER: i32 = 21;
pub const EXIT_OPCODE: i32 = 22;
pub const EXIT_LEX_SYN: i32 = 23;
pub const EXIT_INTERNAL: i32 = 99;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Bad or forbidden combination of command line parameters.
    #[error("invalid parameters: {0}")]
    Param(String),

    #[error("unable to read input on line {line}: {reason}")]
    Input { line: usize, reason: String },

    #[error("unable to write output: {0}")]
    Output(String),

    /// The first line bearing code was not the header.
    #[error("line {line}: invalid header, expected `{expected}`, got `{found}`")]
    Header {
        line: usize,
        expected: &'static str,
        found: String,
    },

    /// The input ended before any line bearing code.
    #[error("missing header, reached end of input before `{expected}`")]
    MissingHeader { expected: &'static str },

    #[error("line {line}: unknown opcode `{token}`")]
    UnknownOpcode { line: usize, token: String },

    #[error("line {line}: {opcode} expects {expected} argument(s), got {found}")]
    Arity {
        line: usize,
        opcode: String,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: {opcode} argument {position} `{token}` is not a valid {expected}")]
    ArgumentType {
        line: usize,
        opcode: String,
        position: usize,
        token: String,
        expected: &'static str,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ParseError {
    /// Process exit code the driver terminates with for this error.
    pub fn exit_code(&self) -> i32 {
        use ParseError::*;
        match self {
            Param(_) => EXIT_PARAM,
            Input { .. } => EXIT_INPUT,
            Output(_) => EXIT_OUTPUT,
            Header { .. } | MissingHeader { .. } => EXIT_HEADER,
            UnknownOpcode { .. } => EXIT_OPCODE,
            Arity { .. } | ArgumentType { .. } => EXIT_LEX_SYN,
            Internal(_) => EXIT_INTERNAL,
        }
    }
}

impl From<std::fmt::Error> for ParseError {
    fn from(_: std::fmt::Error) -> Self {
        ParseError::Internal("failed to format the program document".to_owned())
    }
}
