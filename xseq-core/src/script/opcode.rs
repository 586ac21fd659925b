use serde::Serialize;

/// Instruction `type` field.
///
/// Every documented opcode has its own variant; anything else (including
/// the call family) lands in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Opcode {
    Yield,
    Return,
    Exit,
    JumpIf,
    Jump,
    JumpIfNot,
    Assign,
    BitNot,
    Negate,
    Not,
    And,
    Or,
    Equal,
    NotEqual,
    GreaterEqual,
    LessEqual,
    Greater,
    Less,
    AddOne,
    SubOne,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    PostIncrement,
    PostDecrement,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    Cast511,
    Cast512,
    Cast513,
    Switch,
    New,
    Index,
    Unknown(u16),
}

/// Opcode families the generator recognises but cannot render yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum UnsupportedKind {
    Cast,
    Switch,
    New,
}

impl From<u16> for Opcode {
    fn from(v: u16) -> Self {
        match v {
            10 => Opcode::Yield,
            11 => Opcode::Return,
            12 => Opcode::Exit,
            30 => Opcode::JumpIf,
            31 => Opcode::Jump,
            33 => Opcode::JumpIfNot,
            100 => Opcode::Assign,
            110 => Opcode::BitNot,
            112 => Opcode::Negate,
            120 => Opcode::Not,
            121 => Opcode::And,
            122 => Opcode::Or,
            130 => Opcode::Equal,
            131 => Opcode::NotEqual,
            132 => Opcode::GreaterEqual,
            133 => Opcode::LessEqual,
            134 => Opcode::Greater,
            135 => Opcode::Less,
            140 => Opcode::AddOne,
            141 => Opcode::SubOne,
            150 => Opcode::Add,
            151 => Opcode::Sub,
            152 => Opcode::Mul,
            153 => Opcode::Div,
            154 => Opcode::Mod,
            160 => Opcode::BitAnd,
            161 => Opcode::BitOr,
            162 => Opcode::BitXor,
            170 => Opcode::ShiftLeft,
            171 => Opcode::ShiftRight,
            240 => Opcode::PostIncrement,
            241 => Opcode::PostDecrement,
            250 => Opcode::AddAssign,
            251 => Opcode::SubAssign,
            252 => Opcode::MulAssign,
            253 => Opcode::DivAssign,
            254 => Opcode::ModAssign,
            260 => Opcode::BitAndAssign,
            261 => Opcode::BitOrAssign,
            262 => Opcode::BitXorAssign,
            270 => Opcode::ShiftLeftAssign,
            271 => Opcode::ShiftRightAssign,
            511 => Opcode::Cast511,
            512 => Opcode::Cast512,
            513 => Opcode::Cast513,
            523 => Opcode::Switch,
            530 => Opcode::New,
            531 => Opcode::Index,
            other => Opcode::Unknown(other),
        }
    }
}

impl Opcode {
    pub const CALL: u16 = 20;

    pub fn code(self) -> u16 {
        match self {
            Opcode::Yield => 10,
            Opcode::Return => 11,
            Opcode::Exit => 12,
            Opcode::JumpIf => 30,
            Opcode::Jump => 31,
            Opcode::JumpIfNot => 33,
            Opcode::Assign => 100,
            Opcode::BitNot => 110,
            Opcode::Negate => 112,
            Opcode::Not => 120,
            Opcode::And => 121,
            Opcode::Or => 122,
            Opcode::Equal => 130,
            Opcode::NotEqual => 131,
            Opcode::GreaterEqual => 132,
            Opcode::LessEqual => 133,
            Opcode::Greater => 134,
            Opcode::Less => 135,
            Opcode::AddOne => 140,
            Opcode::SubOne => 141,
            Opcode::Add => 150,
            Opcode::Sub => 151,
            Opcode::Mul => 152,
            Opcode::Div => 153,
            Opcode::Mod => 154,
            Opcode::BitAnd => 160,
            Opcode::BitOr => 161,
            Opcode::BitXor => 162,
            Opcode::ShiftLeft => 170,
            Opcode::ShiftRight => 171,
            Opcode::PostIncrement => 240,
            Opcode::PostDecrement => 241,
            Opcode::AddAssign => 250,
            Opcode::SubAssign => 251,
            Opcode::MulAssign => 252,
            Opcode::DivAssign => 253,
            Opcode::ModAssign => 254,
            Opcode::BitAndAssign => 260,
            Opcode::BitOrAssign => 261,
            Opcode::BitXorAssign => 262,
            Opcode::ShiftLeftAssign => 270,
            Opcode::ShiftRightAssign => 271,
            Opcode::Cast511 => 511,
            Opcode::Cast512 => 512,
            Opcode::Cast513 => 513,
            Opcode::Switch => 523,
            Opcode::New => 530,
            Opcode::Index => 531,
            Opcode::Unknown(v) => v,
        }
    }

    pub fn unary_operator(self) -> Option<&'static str> {
        match self {
            Opcode::BitNot => Some("~"),
            Opcode::Negate => Some("-"),
            Opcode::Not => Some("not "),
            _ => None,
        }
    }

    pub fn binary_operator(self) -> Option<&'static str> {
        let op = match self {
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Equal => "==",
            Opcode::NotEqual => "!=",
            Opcode::GreaterEqual => ">=",
            Opcode::LessEqual => "<=",
            Opcode::Greater => ">",
            Opcode::Less => "<",
            Opcode::Add => "+",
            Opcode::Sub => "-",
            Opcode::Mul => "*",
            Opcode::Div => "/",
            Opcode::Mod => "%",
            Opcode::BitAnd => "&",
            Opcode::BitOr => "|",
            Opcode::BitXor => "^",
            Opcode::ShiftLeft => "<<",
            Opcode::ShiftRight => ">>",
            _ => return None,
        };
        Some(op)
    }

    pub fn compound_operator(self) -> Option<&'static str> {
        let op = match self {
            Opcode::AddAssign => "+=",
            Opcode::SubAssign => "-=",
            Opcode::MulAssign => "*=",
            Opcode::DivAssign => "/=",
            Opcode::ModAssign => "%=",
            Opcode::BitAndAssign => "&=",
            Opcode::BitOrAssign => "|=",
            Opcode::BitXorAssign => "^=",
            Opcode::ShiftLeftAssign => "<<=",
            Opcode::ShiftRightAssign => ">>=",
            _ => return None,
        };
        Some(op)
    }

    pub fn unsupported_kind(self) -> Option<UnsupportedKind> {
        match self {
            Opcode::Cast511 | Opcode::Cast512 | Opcode::Cast513 => Some(UnsupportedKind::Cast),
            Opcode::Switch => Some(UnsupportedKind::Switch),
            Opcode::New => Some(UnsupportedKind::New),
            _ => None,
        }
    }

    /// Jump instructions whose hash argument names a label.
    pub fn targets_jump(self) -> bool {
        matches!(self, Opcode::JumpIf | Opcode::Jump | Opcode::JumpIfNot)
    }

    /// Fewest arguments the rendered statement reads.
    pub fn min_arguments(self) -> usize {
        match self {
            Opcode::JumpIf | Opcode::JumpIfNot | Opcode::Index => 2,
            Opcode::Jump
            | Opcode::Assign
            | Opcode::BitNot
            | Opcode::Negate
            | Opcode::Not
            | Opcode::AddOne
            | Opcode::SubOne => 1,
            op if op.binary_operator().is_some() => 2,
            op if op.compound_operator().is_some() => 1,
            _ => 0,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        self.into()
    }
}
