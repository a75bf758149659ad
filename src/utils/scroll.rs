//! Viewport offset over the visual line sequence.

/// Largest valid scroll offset for `total_lines` shown in `viewport_height` rows.
pub fn max_scroll_offset(total_lines: usize, viewport_height: usize) -> usize {
    total_lines.saturating_sub(viewport_height)
}

/// Lines moved by a page up/down: half the viewport, at least one.
pub fn page_step(viewport_height: usize) -> usize {
    (viewport_height / 2).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    pub position: usize,
    /// Keep the newest content in view as the transcript grows.
    pub auto_follow: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            position: 0,
            auto_follow: true,
        }
    }
}

impl ScrollState {
    pub fn scroll_by(&mut self, delta: isize, total_lines: usize, viewport_height: usize) {
        let max = max_scroll_offset(total_lines, viewport_height);
        let target = if delta < 0 {
            self.position.saturating_sub(delta.unsigned_abs())
        } else {
            self.position.saturating_add(delta.unsigned_abs())
        };
        self.position = target.min(max);
        self.auto_follow = self.position == max;
    }

    pub fn page_up(&mut self, total_lines: usize, viewport_height: usize) {
        let step = page_step(viewport_height) as isize;
        self.scroll_by(-step, total_lines, viewport_height);
    }

    pub fn page_down(&mut self, total_lines: usize, viewport_height: usize) {
        let step = page_step(viewport_height) as isize;
        self.scroll_by(step, total_lines, viewport_height);
    }

    pub fn to_top(&mut self, total_lines: usize, viewport_height: usize) {
        self.position = 0;
        self.auto_follow = max_scroll_offset(total_lines, viewport_height) == 0;
    }

    pub fn to_bottom(&mut self, total_lines: usize, viewport_height: usize) {
        self.position = max_scroll_offset(total_lines, viewport_height);
        self.auto_follow = true;
    }

    /// Re-applies the bounds after the transcript or viewport changed.
    ///
    /// Pins to the bottom while following; otherwise only clamps, so a reader
    /// scrolled into history stays where they are.
    pub fn follow(&mut self, total_lines: usize, viewport_height: usize) {
        let max = max_scroll_offset(total_lines, viewport_height);
        if self.auto_follow {
            self.position = max;
        } else {
            self.position = self.position.min(max);
        }
    }

    pub fn is_at_bottom(&self, total_lines: usize, viewport_height: usize) -> bool {
        self.position >= max_scroll_offset(total_lines, viewport_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_stays_in_bounds() {
        let mut scroll = ScrollState::default();
        let (total, height) = (50, 10);
        let max = max_scroll_offset(total, height);

        scroll.scroll_by(-7, total, height);
        assert_eq!(scroll.position, 0);
        scroll.scroll_by(1000, total, height);
        assert_eq!(scroll.position, max);
        scroll.page_up(total, height);
        assert_eq!(scroll.position, max - 5);
        for _ in 0..20 {
            scroll.page_up(total, height);
            assert!(scroll.position <= max);
        }
        assert_eq!(scroll.position, 0);
        scroll.page_down(total, height);
        assert_eq!(scroll.position, 5);
        scroll.to_bottom(total, height);
        assert_eq!(scroll.position, max);
        scroll.to_top(total, height);
        assert_eq!(scroll.position, 0);
    }

    #[test]
    fn short_transcript_never_scrolls() {
        let mut scroll = ScrollState::default();
        scroll.scroll_by(3, 4, 10);
        assert_eq!(scroll.position, 0);
        scroll.page_up(4, 10);
        assert_eq!(scroll.position, 0);
        assert!(scroll.auto_follow);
    }

    #[test]
    fn explicit_scroll_away_disables_follow() {
        let mut scroll = ScrollState::default();
        scroll.follow(30, 10);
        assert_eq!(scroll.position, 20);

        scroll.scroll_by(-5, 30, 10);
        assert!(!scroll.auto_follow);
        assert_eq!(scroll.position, 15);

        scroll.follow(35, 10);
        assert_eq!(scroll.position, 15);
    }

    #[test]
    fn reaching_bottom_reenables_follow() {
        let mut scroll = ScrollState::default();
        scroll.follow(30, 10);
        scroll.scroll_by(-2, 30, 10);
        assert!(!scroll.auto_follow);
        scroll.scroll_by(2, 30, 10);
        assert!(scroll.auto_follow);
        scroll.follow(40, 10);
        assert_eq!(scroll.position, 30);
    }

    #[test]
    fn to_top_disables_follow_when_content_overflows() {
        let mut scroll = ScrollState::default();
        scroll.to_top(30, 10);
        assert!(!scroll.auto_follow);
        scroll.to_bottom(30, 10);
        assert!(scroll.auto_follow);
        assert!(scroll.is_at_bottom(30, 10));
    }

    #[test]
    fn follow_clamps_after_shrink() {
        let mut scroll = ScrollState {
            position: 25,
            auto_follow: false,
        };
        scroll.follow(20, 10);
        assert_eq!(scroll.position, 10);
    }

    #[test]
    fn page_step_is_half_viewport() {
        assert_eq!(page_step(20), 10);
        assert_eq!(page_step(1), 1);
        assert_eq!(page_step(0), 1);
    }
}
