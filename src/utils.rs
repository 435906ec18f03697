use std::{cell::Cell, rc::Rc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerHandle(pub i32);

/// Timer source for deferred work. The browser implementation wraps `setTimeout`.
pub trait Scheduler {
    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TimerHandle;
    fn clear_timeout(&self, handle: TimerHandle);
}

/// Runs `f` with the most recent argument once `wait_ms` has passed without another call.
pub fn debounce<A, F>(scheduler: Rc<dyn Scheduler>, wait_ms: u32, f: F) -> impl Fn(A)
where
    A: 'static,
    F: Fn(A) + 'static,
{
    let f = Rc::new(f);
    let pending: Rc<Cell<Option<TimerHandle>>> = Rc::new(Cell::new(None));

    move |arg: A| {
        if let Some(handle) = pending.take() {
            scheduler.clear_timeout(handle);
        }

        let f = Rc::clone(&f);
        let slot = Rc::clone(&pending);
        let handle = scheduler.set_timeout(
            wait_ms,
            Box::new(move || {
                slot.set(None);
                f(arg);
            }),
        );
        pending.set(Some(handle));
    }
}

/// Leading-edge throttle: the first call runs immediately, calls during the following
/// `limit_ms` are dropped.
pub fn throttle<A, F>(scheduler: Rc<dyn Scheduler>, limit_ms: u32, f: F) -> impl Fn(A)
where
    A: 'static,
    F: Fn(A) + 'static,
{
    let blocked = Rc::new(Cell::new(false));

    move |arg: A| {
        if blocked.get() {
            return;
        }

        f(arg);
        blocked.set(true);

        let blocked = Rc::clone(&blocked);
        scheduler.set_timeout(limit_ms, Box::new(move || blocked.set(false)));
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

pub fn is_element_in_viewport(rect: Rect, viewport: Viewport) -> bool {
    rect.top >= 0.0
        && rect.left >= 0.0
        && rect.bottom <= viewport.height
        && rect.right <= viewport.width
}

/// Elements waiting on their first intersection. Each one is handed out by [`take`] once.
///
/// [`take`]: Watchlist::take
pub struct Watchlist<N> {
    pending: Vec<N>,
}

impl<N> Default for Watchlist<N> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<N: PartialEq> Watchlist<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch(&mut self, node: N) {
        if !self.pending.contains(&node) {
            self.pending.push(node);
        }
    }

    pub fn take(&mut self, target: &N) -> Option<N> {
        let index = self.pending.iter().position(|node| node == target)?;
        Some(self.pending.swap_remove(index))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::{testing::ManualScheduler, *};
    use std::cell::RefCell;

    fn recorder(clock: &Rc<ManualScheduler>) -> (Rc<RefCell<Vec<(u32, u32)>>>, impl Fn(u32)) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let clock = Rc::clone(clock);
        (calls, move |arg: u32| sink.borrow_mut().push((clock.now(), arg)))
    }

    #[test]
    fn throttle_runs_on_leading_edge_and_after_limit() {
        let clock = Rc::new(ManualScheduler::default());
        let (calls, f) = recorder(&clock);
        let throttled = throttle(clock.clone(), 1_000, f);

        for at in [0, 100, 200, 1_100] {
            clock.advance_to(at);
            throttled(at);
        }

        assert_eq!(*calls.borrow(), vec![(0, 0), (1_100, 1_100)]);
    }

    #[test]
    fn debounce_fires_once_after_quiet_period_with_latest_argument() {
        let clock = Rc::new(ManualScheduler::default());
        let (calls, f) = recorder(&clock);
        let debounced = debounce(clock.clone(), 300, f);

        for at in [0, 100, 200] {
            clock.advance_to(at);
            debounced(at);
        }
        assert_eq!(clock.pending(), 1);

        clock.advance_to(2_000);

        assert_eq!(*calls.borrow(), vec![(500, 200)]);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn debounce_can_fire_again_after_settling() {
        let clock = Rc::new(ManualScheduler::default());
        let (calls, f) = recorder(&clock);
        let debounced = debounce(clock.clone(), 300, f);

        debounced(1);
        clock.advance_to(400);
        debounced(2);
        clock.advance_to(1_000);

        assert_eq!(*calls.borrow(), vec![(300, 1), (700, 2)]);
    }

    #[test]
    fn viewport_check_requires_all_four_edges_inside() {
        let viewport = Viewport {
            width: 1_280.0,
            height: 720.0,
        };
        let inside = Rect {
            top: 10.0,
            left: 0.0,
            bottom: 720.0,
            right: 1_280.0,
        };

        assert!(is_element_in_viewport(inside, viewport));
        assert!(!is_element_in_viewport(Rect { top: -1.0, ..inside }, viewport));
        assert!(!is_element_in_viewport(Rect { left: -0.5, ..inside }, viewport));
        assert!(!is_element_in_viewport(Rect { bottom: 721.0, ..inside }, viewport));
        assert!(!is_element_in_viewport(Rect { right: 1_281.0, ..inside }, viewport));
    }

    #[test]
    fn watchlist_hands_out_each_node_once() {
        let mut watchlist = Watchlist::new();
        watchlist.watch("a");
        watchlist.watch("b");
        watchlist.watch("a");
        assert_eq!(watchlist.len(), 2);

        assert_eq!(watchlist.take(&"a"), Some("a"));
        assert_eq!(watchlist.take(&"a"), None);
        assert_eq!(watchlist.take(&"c"), None);
        assert_eq!(watchlist.take(&"b"), Some("b"));
        assert!(watchlist.is_empty());
    }
}
