/// A result type defaulting to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `firn` can emit.
///
/// Node identity resolution never fails (it degrades to defaults), signature
/// derivation has no error path, and the generator's mutex does not poison.
/// The only runtime failure is a clock that has moved backwards further than
/// the generator is willing to wait out.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The wall clock was observed behind the last issued timestamp by more
    /// than the rollback tolerance.
    ///
    /// The generator's state is left untouched, so a later call made once the
    /// clock has caught up will succeed. Callers should retry after a short
    /// delay or reject the write.
    #[error("clock moved backwards by {offset_ms}ms; refusing to generate an id")]
    ClockMovedBackwards {
        /// How far behind the clock was, in milliseconds.
        offset_ms: u64,
    },
}
