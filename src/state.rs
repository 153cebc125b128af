/// Whether this run should actually talk to any issue trackers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RunType<T> {
    /// Signifies that this is a dry run. No credentials are read and no requests are made, only
    /// describe what would happen.
    DryRun(T),
    /// This is a real run, actually do the thing.
    Real(T),
}

impl<T> RunType<T> {
    pub(crate) fn take(self) -> (RunType<()>, T) {
        match self {
            RunType::DryRun(inner) => (RunType::DryRun(()), inner),
            RunType::Real(inner) => (RunType::Real(()), inner),
        }
    }
}
