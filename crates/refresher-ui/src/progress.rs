use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use is_terminal::IsTerminal;

/// Spinner frame interval.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

const FRAMES: &[&str] = &["|", "/", "-", "\\", "|"];

/// A ticking spinner shown while some work is in flight.
///
/// The spinner redraws from its own thread, so it keeps moving while the
/// wrapped work blocks. It is erased when [`ProgressIndicator::finish`] is
/// called or when it is dropped, whichever comes first.
#[derive(Debug)]
pub struct ProgressIndicator {
    bar: ProgressBar,
}

impl ProgressIndicator {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_visibility(message, std::io::stderr().is_terminal())
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn with_visibility(message: impl Into<String>, visible: bool) -> Self {
        if !visible {
            return Self::hidden();
        }
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .map(|style| style.tick_strings(FRAMES))
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(message.into());
        bar.enable_steady_tick(TICK_INTERVAL);
        Self { bar }
    }

    /// Whether the spinner is drawing to the terminal.
    pub fn is_visible(&self) -> bool {
        !self.bar.is_hidden()
    }

    /// Stops the spinner and erases it from the terminal.
    pub fn finish(self) {
        drop(self)
    }

    /// Runs `work` with a spinner showing `message`, clearing the spinner
    /// before returning `work`'s output untouched.
    pub async fn wrap<F, T>(message: impl Into<String>, visible: bool, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let indicator = Self::with_visibility(message, visible);
        let out = work.await;
        indicator.finish();
        out
    }
}

impl Drop for ProgressIndicator {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
