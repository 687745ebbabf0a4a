use crate::state::week::WeekKey;

/// Per-request context of a member operation: who is acting, and on which week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub member: String,
    pub week: WeekKey,
}

impl Session {
    pub fn new(member: impl Into<String>, week: WeekKey) -> Self {
        Self {
            member: member.into(),
            week,
        }
    }
}
