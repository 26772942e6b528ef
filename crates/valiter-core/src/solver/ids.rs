/// Dense position of a state inside a compiled transition table.
/// Indices follow the ascending `Ord` order of the states, so they never depend on how
/// the model happened to enumerate them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct StateIndex(usize);

impl StateIndex {
    /// Return the underlying position.
    pub(crate) fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for StateIndex {
    fn from(value: usize) -> Self {
        StateIndex(value)
    }
}
