use std::time::{Duration, Instant};

use super::session::PageFingerprint;

/// Reveals a page's tokens one at a time on a fixed interval.
///
/// Purely visual pacing, unrelated to narration. The count is derived from the
/// start instant, so a restarted timer always begins again from zero.
#[derive(Debug, Clone)]
pub struct Typewriter {
    interval: Duration,
    run: Option<Run>,
}

#[derive(Debug, Clone, Copy)]
struct Run {
    page: PageFingerprint,
    total: usize,
    started: Instant,
}

impl Typewriter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            run: None,
        }
    }

    /// Start revealing `total` tokens of `page` from nothing.
    pub fn restart(&mut self, page: PageFingerprint, total: usize, now: Instant) {
        self.run = Some(Run {
            page,
            total,
            started: now,
        });
    }

    /// Idempotent.
    pub fn cancel(&mut self) {
        self.run = None;
    }

    pub fn page(&self) -> Option<PageFingerprint> {
        self.run.map(|run| run.page)
    }

    /// Tokens visible at `now`. Zero when no page is running.
    pub fn visible_count(&self, now: Instant) -> usize {
        let Some(run) = self.run else {
            return 0;
        };
        if self.interval.is_zero() {
            return run.total;
        }
        let ticks = now.saturating_duration_since(run.started).as_nanos() / self.interval.as_nanos();
        usize::try_from(ticks).unwrap_or(usize::MAX).min(run.total)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.run
            .is_some_and(|run| self.visible_count(now) >= run.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn reveals_one_token_per_interval() {
        let start = Instant::now();
        let page = PageFingerprint::of(0, "a b c");
        let mut typewriter = Typewriter::new(TICK);
        typewriter.restart(page, 3, start);

        assert_eq!(typewriter.visible_count(start), 0);
        assert_eq!(typewriter.visible_count(start + Duration::from_millis(99)), 0);
        assert_eq!(typewriter.visible_count(start + Duration::from_millis(100)), 1);
        assert_eq!(typewriter.visible_count(start + Duration::from_millis(250)), 2);
        assert!(!typewriter.is_finished(start + Duration::from_millis(250)));
        assert_eq!(typewriter.visible_count(start + Duration::from_secs(5)), 3);
        assert!(typewriter.is_finished(start + Duration::from_secs(5)));
    }

    #[test]
    fn restart_begins_from_zero() {
        let start = Instant::now();
        let first = PageFingerprint::of(0, "a b c");
        let second = PageFingerprint::of(1, "d e");
        let mut typewriter = Typewriter::new(TICK);

        typewriter.restart(first, 3, start);
        typewriter.cancel();
        typewriter.cancel();
        assert_eq!(typewriter.visible_count(start + TICK * 2), 0);
        assert_eq!(typewriter.page(), None);

        let back = start + Duration::from_secs(1);
        typewriter.restart(second, 2, back);
        typewriter.restart(first, 3, back);
        assert_eq!(typewriter.page(), Some(first));
        assert_eq!(typewriter.visible_count(back), 0);
        assert_eq!(typewriter.visible_count(back + TICK), 1);
    }

    #[test]
    fn zero_interval_shows_everything() {
        let now = Instant::now();
        let mut typewriter = Typewriter::new(Duration::ZERO);
        typewriter.restart(PageFingerprint::of(0, "a b"), 2, now);
        assert_eq!(typewriter.visible_count(now), 2);
    }
}
