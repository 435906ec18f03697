use serde_json::json;
use std::fmt::Display;

use crate::logging::Logger;

/// One independently wired page feature.
pub struct WiringStep<C, E> {
    pub feature: &'static str,
    pub wire: fn(&mut C) -> Result<(), E>,
}

impl<C, E> WiringStep<C, E> {
    pub const fn new(feature: &'static str, wire: fn(&mut C) -> Result<(), E>) -> Self {
        Self { feature, wire }
    }
}

/// Runs every step in order. A step that fails is logged and skipped, and whatever it
/// attached before failing stays in `context`. Returns the features that failed.
pub fn wire_features<C, E: Display>(
    context: &mut C,
    steps: &[WiringStep<C, E>],
    logger: Logger,
) -> Vec<&'static str> {
    let mut failed = Vec::new();
    for step in steps {
        if let Err(error) = (step.wire)(context) {
            logger.error(
                "feature_init_failed",
                json!({ "feature": step.feature, "error": error.to_string() }),
            );
            failed.push(step.feature);
        }
    }
    failed
}
