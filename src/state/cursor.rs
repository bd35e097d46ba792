/// Inclusive block range processed in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub from: u64,
    pub to: u64,
}

/// Tracks the highest block fully committed to output.
///
/// Starts unset; the first window reaches back `initial_lookback`
/// blocks from the head, every later window starts right after the
/// last committed block. Committed blocks are never requested again.
#[derive(Debug, Default)]
pub struct PollCursor {
    last_committed: Option<u64>,
}

impl PollCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_committed(&self) -> Option<u64> {
        self.last_committed
    }

    /// The next window to fetch, or `None` when the chain has not
    /// advanced past the cursor.
    pub fn next_window(&self, latest: u64, initial_lookback: u64) -> Option<Window> {
        let from = match self.last_committed {
            None => latest.saturating_sub(initial_lookback),
            Some(last) => {
                if last >= latest {
                    return None;
                }
                last + 1
            }
        };
        Some(Window { from, to: latest })
    }

    /// Only called once a window is fully processed, never partially.
    pub fn commit(&mut self, to: u64) {
        self.last_committed = Some(to);
    }
}
