/// Classification for retry policy.
///
/// Collectors poll on a fixed interval, so the only retry a failed fetch ever
/// gets is the next scheduled tick. This enum tells the caller whether that
/// retry can possibly succeed.
///
/// | Class | Keep polling? | Surface to caller of `StartTracking`? |
/// |-------|---------------|---------------------------------------|
/// | `Never` | Yes, but it will keep failing | Yes |
/// | `NextTick` | Yes | No |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The request is fundamentally invalid (unknown symbol).
    /// Retrying won't help.
    Never,

    /// Transient failure: network error, upstream error payload, or no
    /// current quote. Wait for the next tick.
    NextTick,
}

impl RetryClass {
    /// Whether a collector should expect this failure to clear on its own.
    pub fn is_transient(self) -> bool {
        matches!(self, RetryClass::NextTick)
    }
}
