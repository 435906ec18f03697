use crate::{dom::Node, utils::Watchlist};

pub const LAZY_IMAGE_SELECTOR: &str = "img[data-src]";
pub const LAZY_CLASS: &str = "lazy";
pub const DEFERRED_SOURCE_ATTRIBUTE: &str = "data-src";

const LOW_END_CORE_LIMIT: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationProfile {
    pub fast: &'static str,
    pub normal: &'static str,
    pub slow: &'static str,
}

pub const LOW_END_PROFILE: AnimationProfile = AnimationProfile {
    fast: "0.1s",
    normal: "0.2s",
    slow: "0.3s",
};

pub const REDUCED_MOTION_PROFILE: AnimationProfile = AnimationProfile {
    fast: "0.01s",
    normal: "0.01s",
    slow: "0.01s",
};

/// Picks shortened transition timings for the device, or `None` to keep the stylesheet's.
/// Reduced motion wins over the core-count rule. An unknown core count (zero) is ignored.
pub fn animation_profile(hardware_concurrency: Option<f64>, reduced_motion: bool) -> Option<AnimationProfile> {
    if reduced_motion {
        return Some(REDUCED_MOTION_PROFILE);
    }

    hardware_concurrency
        .filter(|cores| *cores > 0.0 && *cores < LOW_END_CORE_LIMIT)
        .map(|_| LOW_END_PROFILE)
}

impl AnimationProfile {
    pub fn apply<N: Node>(&self, root: &N) {
        root.set_style("--transition-fast", self.fast);
        root.set_style("--transition-normal", self.normal);
        root.set_style("--transition-slow", self.slow);
    }
}

/// Images whose real source is assigned on first intersection.
pub struct LazyImageLoader<N> {
    pending: Watchlist<N>,
}

impl<N> Default for LazyImageLoader<N> {
    fn default() -> Self {
        Self {
            pending: Watchlist::default(),
        }
    }
}

impl<N: Node + PartialEq> LazyImageLoader<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch(&mut self, image: N) {
        self.pending.watch(image);
    }

    /// Returns true when the image was loaded by this call and should be unobserved.
    pub fn handle_intersection(&mut self, image: &N, is_intersecting: bool) -> bool {
        if !is_intersecting {
            return false;
        }

        let Some(image) = self.pending.take(image) else {
            return false;
        };
        if let Some(source) = image.attribute(DEFERRED_SOURCE_ATTRIBUTE) {
            image.set_attribute("src", &source);
        }
        image.set_class(LAZY_CLASS, false);
        true
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
