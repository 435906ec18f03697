use crate::{dom::Node, utils::Watchlist};

pub const REVEAL_SELECTOR: &str = ".timeline-item, .skill-category, .project-card, .stat";
pub const REVEAL_THRESHOLD: f64 = 0.1;
pub const REVEAL_ROOT_MARGIN: &str = "0px 0px -50px 0px";

/// Fades tagged elements in the first time they scroll into view.
pub struct RevealAnimator<N> {
    pending: Watchlist<N>,
}

impl<N> Default for RevealAnimator<N> {
    fn default() -> Self {
        Self {
            pending: Watchlist::default(),
        }
    }
}

impl<N: Node + PartialEq> RevealAnimator<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, element: N) {
        element.set_style("opacity", "0");
        element.set_style("transform", "translateY(30px)");
        element.set_style("transition", "opacity 0.6s ease, transform 0.6s ease");
        self.pending.watch(element);
    }

    /// Returns true when `element` was revealed by this call and can be unobserved.
    pub fn handle_intersection(&mut self, element: &N, is_intersecting: bool) -> bool {
        if !is_intersecting {
            return false;
        }

        let Some(element) = self.pending.take(element) else {
            return false;
        };
        element.set_style("opacity", "1");
        element.set_style("transform", "translateY(0)");
        true
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
