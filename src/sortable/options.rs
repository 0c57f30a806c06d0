/// Options for [`super::SortableDrag`], fixed when the controller is built.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SortableOptions {
    /// Selector restricting which descendants of a tracked element start a drag.
    ///
    /// `None` makes the whole element the handle.
    pub handle: Option<String>,

    /// Reorder the dragged element among the tracked elements on drop.
    pub sort: bool,

    /// Without platform drag-and-drop there are no enter events, so the element "beneath" the
    /// pointer is found by hit-testing tracked elements on every pointer move.
    ///
    /// Only used when `sort == true` and the controller runs in manual mode.
    pub hit_test_beneath: bool,

    /// If true, record lifecycle events in a small ring buffer, see
    /// [`super::SortableDrag::debug_log_text`].
    pub debug_event_log: bool,

    /// Maximum number of debug log lines to keep (ring buffer).
    pub debug_event_log_capacity: usize,
}

impl Default for SortableOptions {
    fn default() -> Self {
        Self {
            handle: None,
            sort: false,
            hit_test_beneath: true,
            debug_event_log: false,
            debug_event_log_capacity: 200,
        }
    }
}

impl SortableOptions {
    pub fn sortable() -> Self {
        Self {
            sort: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_handle(mut self, selector: impl Into<String>) -> Self {
        self.handle = Some(selector.into());
        self
    }

    pub(crate) fn manual_hit_test(&self, native_drag_and_drop: bool) -> bool {
        self.sort && self.hit_test_beneath && !native_drag_and_drop
    }
}
