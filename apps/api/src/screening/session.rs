use std::sync::Arc;

use crate::screening::jd_matcher::JobMatcher;
use crate::screening::ranking::RankedResume;

/// In-process state of the current screening: the active JD and its latest results.
#[derive(Default)]
pub struct ActiveScreening {
    matcher: Option<Arc<JobMatcher>>,
    ranked: Vec<RankedResume>,
}

impl ActiveScreening {
    pub fn matcher(&self) -> Option<Arc<JobMatcher>> {
        self.matcher.clone()
    }

    pub fn results(&self) -> &[RankedResume] {
        &self.ranked
    }

    /// Replaces the JD; results ranked against the previous one are dropped.
    pub fn set_matcher(&mut self, matcher: Arc<JobMatcher>) {
        self.matcher = Some(matcher);
        self.ranked.clear();
    }

    pub fn clear_results(&mut self) {
        self.ranked.clear();
    }

    /// Stores results only if they were ranked against the JD that is still active.
    pub fn store_results(&mut self, ranked_with: &Arc<JobMatcher>, ranked: Vec<RankedResume>) -> bool {
        match &self.matcher {
            Some(current) if Arc::ptr_eq(current, ranked_with) => {
                self.ranked = ranked;
                true
            }
            _ => false,
        }
    }
}
