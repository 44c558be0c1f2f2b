use std::{collections::VecDeque, time::Duration};

use serde::{Deserialize, Serialize};

use crate::scene::{OverlayScene, VisualMutation};

const DEFAULT_HISTORY_LIMIT: usize = 1_024;

/// A mutation together with when it was applied and which cycle applied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedMutation {
    pub at: Duration,
    pub generation: u64,
    pub mutation: VisualMutation,
}

/// Owns the overlay scene. Every visible change goes through
/// [`RenderGraph::apply`], which also keeps a bounded history of what was
/// changed and by whom.
#[derive(Debug, Clone)]
pub struct RenderGraph {
    scene: OverlayScene,
    history: VecDeque<AppliedMutation>,
    history_limit: usize,
}

impl Default for RenderGraph {
    fn default() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl RenderGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A limit of zero disables history.
    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            scene: OverlayScene::default(),
            history: VecDeque::new(),
            history_limit,
        }
    }

    pub fn scene(&self) -> &OverlayScene {
        &self.scene
    }

    pub fn apply(&mut self, at: Duration, generation: u64, mutation: VisualMutation) {
        self.scene.apply(&mutation);

        if self.history_limit == 0 {
            return;
        }
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(AppliedMutation {
            at,
            generation,
            mutation,
        });
    }

    pub fn history(&self) -> impl Iterator<Item = &AppliedMutation> {
        self.history.iter()
    }
}
