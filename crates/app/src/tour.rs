pub const STEPS: &[(&str, &str)] = &[
    (
        "Welcome",
        "Each ring of the sunburst is one level of the tree. Arc width follows weight.",
    ),
    (
        "Zoom in",
        "Click an arc that has children to make it the new centre.",
    ),
    ("Zoom out", "Click the centre disc to go back up one level."),
    (
        "Sidebar",
        "Search for a node by name, or pick one of the focus's children from the table.",
    ),
];

/// First-run walkthrough with its own step state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    step: usize,
    open: bool,
}

impl Tour {
    pub fn open() -> Self {
        Self { step: 0, open: true }
    }

    pub fn closed() -> Self {
        Self {
            step: 0,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn seen(&self) -> bool {
        !self.open
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn current(&self) -> (&'static str, &'static str) {
        STEPS[self.step.min(STEPS.len() - 1)]
    }

    pub fn is_last(&self) -> bool {
        self.step + 1 >= STEPS.len()
    }

    /// Advances, closing the tour after the last step.
    pub fn next(&mut self) {
        if self.is_last() {
            self.open = false;
        } else {
            self.step += 1;
        }
    }

    pub fn back(&mut self) {
        self.step = self.step.saturating_sub(1);
    }

    pub fn skip(&mut self) {
        self.open = false;
    }
}
