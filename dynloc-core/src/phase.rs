/// The five phases of a localizer run, in presentation order
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    LeadIn,
    FirstBlock,
    MidFixation,
    SecondBlock,
    LeadOut,
}

impl RunPhase {
    pub fn next(&self) -> Option<Self> {
        use RunPhase::*;
        Some(match self {
            LeadIn => FirstBlock,
            FirstBlock => MidFixation,
            MidFixation => SecondBlock,
            SecondBlock => LeadOut,
            LeadOut => return None,
        })
    }

    pub fn is_fixation(&self) -> bool {
        matches!(self, Self::LeadIn | Self::MidFixation | Self::LeadOut)
    }

    /// Stimulus blocks are walked in reverse category order in the second block.
    pub fn is_reversed(&self) -> bool {
        matches!(self, Self::SecondBlock)
    }

    /// All phases from `LeadIn` through `LeadOut`.
    pub fn sequence() -> impl Iterator<Item = RunPhase> {
        std::iter::successors(Some(RunPhase::default()), |p| p.next())
    }
}
