use std::fmt;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::contracts::error::BlockchainError;
use crate::contracts::ChainReader;
use crate::deposits::assemble::assemble_deposits;
use crate::deposits::Deposit;
use crate::env::EnvVar;
use crate::sinks::Sinks;
use crate::state::cursor::PollCursor;
use crate::state::dedup::SeenDeposits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    Idle,
    Fetching,
    Assembling,
    Committing,
    Sleeping,
}

impl fmt::Display for ObserverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Fetching => write!(f, "fetching"),
            Self::Assembling => write!(f, "assembling"),
            Self::Committing => write!(f, "committing"),
            Self::Sleeping => write!(f, "sleeping"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObserverConfig {
    pub initial_lookback: u64,
    pub poll_interval: Duration,
    pub seen_retention_blocks: u64,
    pub fetch_concurrency: usize,
}

impl ObserverConfig {
    pub fn from_env(env: &EnvVar) -> Self {
        Self {
            initial_lookback: env.initial_lookback,
            poll_interval: Duration::from_secs(env.poll_interval_secs),
            seen_retention_blocks: env.seen_retention_blocks,
            fetch_concurrency: env.fetch_concurrency,
        }
    }
}

/// The ingestion loop: one cycle per timer tick, cycles never overlap,
/// and the cursor only advances after a window was fully processed.
pub struct Observer<R> {
    reader: R,
    config: ObserverConfig,
    sinks: Sinks,
    cursor: PollCursor,
    seen: SeenDeposits,
    state: ObserverState,
}

impl<R: ChainReader> Observer<R> {
    pub fn new(reader: R, config: ObserverConfig, sinks: Sinks) -> Self {
        Self {
            reader,
            config,
            sinks,
            cursor: PollCursor::new(),
            seen: SeenDeposits::new(),
            state: ObserverState::Idle,
        }
    }

    pub fn state(&self) -> ObserverState {
        self.state
    }

    fn set_state(&mut self, next: ObserverState) {
        log::trace!("observer: {} -> {next}", self.state);
        self.state = next;
    }

    pub fn last_committed(&self) -> Option<u64> {
        self.cursor.last_committed()
    }

    /// One ingestion cycle. Returns the deposits first observed in this
    /// cycle, in ascending (block, log index, position) order.
    ///
    /// A [`BlockchainError`] anywhere before the commit aborts the cycle
    /// without advancing the cursor; the window is retried on the next
    /// tick against a possibly newer head.
    pub async fn run_cycle(&mut self) -> Result<Vec<Deposit>, BlockchainError> {
        self.set_state(ObserverState::Fetching);
        let latest = self.reader.latest_height().await?;
        let Some(window) = self.cursor.next_window(latest, self.config.initial_lookback) else {
            log::debug!("chain has not advanced past {latest}, nothing to do");
            self.set_state(ObserverState::Sleeping);
            return Ok(Vec::new());
        };
        let logs = self.reader.deposit_logs(window.from, window.to).await?;
        log::debug!(
            "fetched {} deposit logs in window ({}, {})",
            logs.len(),
            window.from,
            window.to
        );

        self.set_state(ObserverState::Assembling);
        let new = assemble_deposits(
            &self.reader,
            logs,
            &mut self.seen,
            self.config.fetch_concurrency,
        )
        .await?;

        self.set_state(ObserverState::Committing);
        self.cursor.commit(window.to);
        self.seen
            .evict_below(window.to.saturating_sub(self.config.seen_retention_blocks));
        log::info!(
            "committed window ({}, {}): {} new deposits, {} identities retained",
            window.from,
            window.to,
            new.len(),
            self.seen.len()
        );
        self.set_state(ObserverState::Sleeping);
        Ok(new)
    }

    /// Runs cycles on the configured interval until ctrl-c. A tick that
    /// fires while a cycle is still running is skipped, and an in-flight
    /// cycle always finishes (or errors) before shutdown.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_cycle().await {
                        Ok(new) if !new.is_empty() => self.sinks.dispatch(&new).await,
                        Ok(_) => {}
                        Err(err) => log::warn!("cycle aborted, window will be retried: {err}"),
                    }
                    self.set_state(ObserverState::Idle);
                }
                _ = &mut ctrl_c => {
                    log::info!("stop requested, shutting down");
                    break;
                }
            }
        }
        Ok(())
    }
}
