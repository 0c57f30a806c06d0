use super::SortableDrag;

impl SortableDrag {
    pub(super) fn debug_log_event(&mut self, message: impl Into<String>) {
        if !self.options.debug_event_log {
            return;
        }
        self.push_debug_log_line(message.into());
    }

    fn push_debug_log_line(&mut self, message: String) {
        let cap = self.options.debug_event_log_capacity.clamp(1, 10_000);
        while self.debug_log.len() >= cap {
            self.debug_log.pop_front();
        }
        self.debug_log
            .push_back(format!("[drag {}] {}", self.session.serial(), message));
    }

    /// Recorded lifecycle events, one per line. Empty unless
    /// [`super::SortableOptions::debug_event_log`] is set.
    pub fn debug_log_text(&self) -> String {
        self.debug_log
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn debug_log_clear(&mut self) {
        self.debug_log.clear();
    }

    /// Listeners currently held by the controller, for the debug log.
    pub(super) fn debug_listener_summary(&self) -> String {
        format!("listeners=[{}]", self.listeners.summary())
    }
}
