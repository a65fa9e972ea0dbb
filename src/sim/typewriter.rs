//! Progressive text reveal
//!
//! Shows one more character per interval. After the whole string is shown
//! one further interval passes before completion is reported, and it is
//! reported exactly once.

/// Typewriter-style reveal of a single string
#[derive(Debug, Clone, Default)]
pub struct TextReveal {
    text: String,
    interval_ms: f64,
    elapsed_ms: f64,
    /// Interval steps taken so far
    steps: usize,
    running: bool,
    completed: bool,
}

impl TextReveal {
    /// Start (or restart) revealing `text`
    pub fn start(&mut self, text: impl Into<String>, interval_ms: f64) {
        self.text = text.into();
        self.interval_ms = interval_ms.max(1.0);
        self.elapsed_ms = 0.0;
        self.steps = 0;
        self.running = true;
        self.completed = false;
    }

    /// Stop without completing and clear the text; nothing fires afterwards
    pub fn cancel(&mut self) {
        self.text.clear();
        self.steps = 0;
        self.elapsed_ms = 0.0;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Currently visible prefix
    pub fn visible(&self) -> &str {
        let shown = self.steps.min(self.text.chars().count());
        match self.text.char_indices().nth(shown) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }

    /// Advance the reveal; returns true on the frame it completes
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed_ms += dt_ms.max(0.0);

        let total = self.text.chars().count();
        while self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms -= self.interval_ms;
            self.steps += 1;
            if self.steps > total {
                self.running = false;
                self.completed = true;
                return true;
            }
        }
        false
    }
}
