//! The instruction set of IPPcode22 and the argument shape of every opcode.
//!
//! Supported Instructions:
//!
//! ```text
//! CREATEFRAME PUSHFRAME POPFRAME RETURN BREAK      ; no operands
//! DEFVAR POPS <var>
//! PUSHS WRITE EXIT DPRINT <symb>
//! CALL LABEL JUMP <label>
//! READ <var> <type>
//! MOVE NOT INT2CHAR STRLEN TYPE <var> <symb>
//! ADD SUB MUL IDIV LT GT EQ AND OR
//! STRI2INT CONCAT GETCHAR SETCHAR <var> <symb> <symb>
//! JUMPIFEQ JUMPIFNEQ <label> <symb> <symb>
//! ```
/// What an operand at a given position must look like.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ArgClass {
    Var,
    /// A variable or a constant.
    Symb,
    Label,
    Type,
}

impl ArgClass {
    pub fn name(&self) -> &'static str {
        match self {
            ArgClass::Var => "variable",
            ArgClass::Symb => "symbol",
            ArgClass::Label => "label",
            ArgClass::Type => "type",
        }
    }
}

/// Operand count and per-position class of an opcode.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Signature {
    None,
    Var,
    Symb,
    Label,
    VarType,
    VarSymb,
    VarSymbSymb,
    LabelSymbSymb,
}

impl Signature {
    /// The class required at each operand position, in order.
    pub fn classes(&self) -> &'static [ArgClass] {
        use ArgClass as C;
        match self {
            Signature::None          => &[],
            Signature::Var           => &[C::Var],
            Signature::Symb          => &[C::Symb],
            Signature::Label         => &[C::Label],
            Signature::VarType       => &[C::Var, C::Type],
            Signature::VarSymb       => &[C::Var, C::Symb],
            Signature::VarSymbSymb   => &[C::Var, C::Symb, C::Symb],
            Signature::LabelSymbSymb => &[C::Label, C::Symb, C::Symb],
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.classes().len()
    }
}

/// Looks up an opcode regardless of its casing.
/// Returns the canonical uppercase name alongside its signature.
pub fn lookup(op: &str) -> Option<(&'static str, Signature)> {
    use Signature as S;
    let found = match op.to_ascii_lowercase().as_str() {
        "createframe" => ("CREATEFRAME", S::None),
        "pushframe"   => ("PUSHFRAME", S::None),
        "popframe"    => ("POPFRAME", S::None),
        "return"      => ("RETURN", S::None),
        "break"       => ("BREAK", S::None),

        "defvar"      => ("DEFVAR", S::Var),
        "pops"        => ("POPS", S::Var),

        "pushs"       => ("PUSHS", S::Symb),
        "write"       => ("WRITE", S::Symb),
        "exit"        => ("EXIT", S::Symb),
        "dprint"      => ("DPRINT", S::Symb),

        "call"        => ("CALL", S::Label),
        "label"       => ("LABEL", S::Label),
        "jump"        => ("JUMP", S::Label),

        "read"        => ("READ", S::VarType),

        "move"        => ("MOVE", S::VarSymb),
        "not"         => ("NOT", S::VarSymb),
        "int2char"    => ("INT2CHAR", S::VarSymb),
        "strlen"      => ("STRLEN", S::VarSymb),
        "type"        => ("TYPE", S::VarSymb),

        "add"         => ("ADD", S::VarSymbSymb),
        "sub"         => ("SUB", S::VarSymbSymb),
        "mul"         => ("MUL", S::VarSymbSymb),
        "idiv"        => ("IDIV", S::VarSymbSymb),
        "lt"          => ("LT", S::VarSymbSymb),
        "gt"          => ("GT", S::VarSymbSymb),
        "eq"          => ("EQ", S::VarSymbSymb),
        "and"         => ("AND", S::VarSymbSymb),
        "or"          => ("OR", S::VarSymbSymb),
        "stri2int"    => ("STRI2INT", S::VarSymbSymb),
        "concat"      => ("CONCAT", S::VarSymbSymb),
        "getchar"     => ("GETCHAR", S::VarSymbSymb),
        "setchar"     => ("SETCHAR", S::VarSymbSymb),

        "jumpifeq"    => ("JUMPIFEQ", S::LabelSymbSymb),
        "jumpifneq"   => ("JUMPIFNEQ", S::LabelSymbSymb),

        _ => return None,
    };
    Some(found)
}
