use std::fmt;

/// Stable identity of a tableau variable. Ids survive column removal, column
/// positions do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Sign-restricted decision variable (x >= 0)
    Decision,
    /// Positive part of a free decision variable
    PositivePart,
    /// Negative part of a free decision variable
    NegativePart,
    Slack,
    Surplus,
    Artificial,
    /// Under-achievement of a goal
    DeviationMinus,
    /// Over-achievement of a goal
    DeviationPlus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub id: VarId,
    pub kind: VarKind,
    /// Decision variable index for decision kinds, otherwise the constraint
    /// or goal row the variable belongs to
    pub index: usize,
}

impl Variable {
    pub fn new(id: VarId, kind: VarKind, index: usize) -> Self {
        Self { id, kind, index }
    }

    pub fn is_artificial(&self) -> bool {
        self.kind == VarKind::Artificial
    }

    pub fn name(&self) -> String {
        let n = self.index + 1;
        match self.kind {
            VarKind::Decision => format!("x{n}"),
            VarKind::PositivePart => format!("x{n}+"),
            VarKind::NegativePart => format!("x{n}-"),
            VarKind::Slack => format!("s{n}"),
            VarKind::Surplus => format!("e{n}"),
            VarKind::Artificial => format!("a{n}"),
            VarKind::DeviationMinus => format!("y{n}-"),
            VarKind::DeviationPlus => format!("y{n}+"),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
