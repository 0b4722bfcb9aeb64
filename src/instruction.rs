#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant => write!(f, "constant"),
            Self::Argument => write!(f, "argument"),
            Self::Local => write!(f, "local"),
            Self::Static => write!(f, "static"),
            Self::This => write!(f, "this"),
            Self::That => write!(f, "that"),
            Self::Pointer => write!(f, "pointer"),
            Self::Temp => write!(f, "temp"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl std::fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Sub => write!(f, "sub"),
            Self::Neg => write!(f, "neg"),
            Self::Eq => write!(f, "eq"),
            Self::Gt => write!(f, "gt"),
            Self::Lt => write!(f, "lt"),
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Not => write!(f, "not"),
        }
    }
}

/// One line of VM code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Push(Segment, usize),
    Pop(Segment, usize),
    Arithmetic(ArithmeticOp),
    Label(String),
    Goto(String),
    IfGoto(String),
    Call(String, usize),
    Function(String, usize),
    Return,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push(segment, index) => write!(f, "push {segment} {index}"),
            Self::Pop(segment, index) => write!(f, "pop {segment} {index}"),
            Self::Arithmetic(op) => write!(f, "{op}"),
            Self::Label(label) => write!(f, "label {label}"),
            Self::Goto(label) => write!(f, "goto {label}"),
            Self::IfGoto(label) => write!(f, "if-goto {label}"),
            Self::Call(name, n_args) => write!(f, "call {name} {n_args}"),
            Self::Function(name, n_locals) => write!(f, "function {name} {n_locals}"),
            Self::Return => write!(f, "return"),
        }
    }
}
