use crate::ui::icons::{CHECK, CROSS, SPARKLE};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Labels of the cosmetic generation phases, in order.
pub const GENERATION_STEPS: [&str; 4] = [
    "Researching market",
    "Building product",
    "Writing listing",
    "Finalizing package",
];

/// Default delays (from start) at which the indicator moves to steps 1 and 2.
pub const DEFAULT_STEP_DELAYS: [Duration; 2] = [Duration::from_secs(8), Duration::from_secs(20)];

fn step_message(step: usize) -> String {
    let label = GENERATION_STEPS
        .get(step)
        .copied()
        .unwrap_or(GENERATION_STEPS[GENERATION_STEPS.len() - 1]);
    format!(
        "{} {}",
        style(format!("[{}/{}]", step + 1, GENERATION_STEPS.len())).dim(),
        label
    )
}

/// Simulated progress through [`GENERATION_STEPS`] on fixed timers.
///
/// The steps say nothing about the real request. Timers are tokio tasks owned
/// by the ticker: [`StepTicker::cancel`] aborts them, and so does dropping the
/// ticker, so a late timer can never repaint the indicator.
pub struct StepTicker {
    step: Arc<AtomicUsize>,
    timers: Vec<JoinHandle<()>>,
    bar: Option<ProgressBar>,
}

impl StepTicker {
    /// Start at step 0 and schedule one advance per delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(delays: &[Duration], bar: Option<ProgressBar>) -> Self {
        let step = Arc::new(AtomicUsize::new(0));
        if let Some(bar) = &bar {
            bar.set_message(step_message(0));
        }

        let timers = delays
            .iter()
            .enumerate()
            .map(|(i, delay)| {
                let step = Arc::clone(&step);
                let bar = bar.clone();
                let delay = *delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    step.fetch_max(i + 1, Ordering::SeqCst);
                    if let Some(bar) = bar {
                        bar.set_message(step_message(i + 1));
                    }
                })
            })
            .collect();

        Self { step, timers, bar }
    }

    pub fn step(&self) -> usize {
        self.step.load(Ordering::SeqCst)
    }

    /// Abort every pending timer, fired or not.
    pub fn cancel(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }

    /// Cancel the timers and jump to the last step.
    pub fn finish(&mut self) {
        self.cancel();
        let last = GENERATION_STEPS.len() - 1;
        self.step.store(last, Ordering::SeqCst);
        if let Some(bar) = &self.bar {
            bar.set_message(step_message(last));
        }
    }
}

impl Drop for StepTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Terminal spinner for one agent call.
pub struct GenerationUI {
    bar: ProgressBar,
}

impl GenerationUI {
    pub fn new(prefix: &str) -> Self {
        let spinner_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style);
        bar.set_prefix(prefix.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// A handle the step ticker can repaint.
    pub fn bar(&self) -> ProgressBar {
        self.bar.clone()
    }

    pub fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    pub fn success(&self, msg: &str) {
        self.bar
            .finish_with_message(format!("{}{}", CHECK, style(msg).green()));
    }

    pub fn done(&self, msg: &str) {
        self.bar.finish_with_message(format!("{}{}", SPARKLE, msg));
    }

    pub fn failed(&self, msg: &str) {
        self.bar
            .finish_with_message(format!("{}{}", CROSS, style(msg).red()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_advances_on_fixed_delays() {
        let ticker = StepTicker::start(&DEFAULT_STEP_DELAYS, None);
        assert_eq!(ticker.step(), 0);

        tokio::time::sleep(Duration::from_millis(8_001)).await;
        settle().await;
        assert_eq!(ticker.step(), 1);

        tokio::time::sleep(Duration::from_secs(12)).await;
        settle().await;
        assert_eq!(ticker.step(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_pending_timers() {
        let mut ticker = StepTicker::start(&DEFAULT_STEP_DELAYS, None);
        tokio::time::sleep(Duration::from_secs(1)).await;
        ticker.cancel();

        tokio::time::sleep(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(ticker.step(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_first_timer_fired_stops_the_second() {
        let mut ticker = StepTicker::start(&DEFAULT_STEP_DELAYS, None);
        tokio::time::sleep(Duration::from_secs(9)).await;
        settle().await;
        assert_eq!(ticker.step(), 1);
        ticker.cancel();

        tokio::time::sleep(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(ticker.step(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn finish_jumps_to_last_step_and_stays() {
        let mut ticker = StepTicker::start(&DEFAULT_STEP_DELAYS, None);
        ticker.finish();
        assert_eq!(ticker.step(), GENERATION_STEPS.len() - 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(ticker.step(), GENERATION_STEPS.len() - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_ticker_aborts_timers() {
        let step = {
            let ticker = StepTicker::start(&DEFAULT_STEP_DELAYS, None);
            Arc::clone(&ticker.step)
        };
        tokio::time::sleep(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(step.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn step_message_clamps_out_of_range() {
        assert!(step_message(0).contains("Researching market"));
        assert!(step_message(9).contains("Finalizing package"));
    }
}
