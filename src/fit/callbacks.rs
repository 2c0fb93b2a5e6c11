//! Checkpoint and early-stopping policies for the epoch loop.
//!
//! Both are plain state machines fed one validation loss per epoch, so they can
//! be tested without a model.

/// Keeps the parameters of the best epoch seen so far.
///
/// Only a strict improvement replaces the checkpoint; a tie keeps the earlier
/// epoch. A NaN loss never counts as an improvement.
#[derive(Debug, Clone)]
pub struct CheckpointTracker<P> {
    best_loss: f64,
    best: Option<(usize, P)>,
}

impl<P> Default for CheckpointTracker<P> {
    fn default() -> Self {
        Self {
            best_loss: f64::INFINITY,
            best: None,
        }
    }
}

impl<P> CheckpointTracker<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `val_loss` for `epoch`. `snapshot` is only called on improvement.
    pub fn observe(&mut self, epoch: usize, val_loss: f64, snapshot: impl FnOnce() -> P) -> bool {
        if val_loss < self.best_loss {
            self.best_loss = val_loss;
            self.best = Some((epoch, snapshot()));
            true
        } else {
            false
        }
    }

    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best.as_ref().map(|(epoch, _)| *epoch)
    }

    /// Consume the tracker, returning `(epoch, params)` of the best checkpoint.
    pub fn into_best(self) -> Option<(usize, P)> {
        self.best
    }
}

/// Counts epochs since the last improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarlyStopping {
    patience: usize,
    wait: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self { patience, wait: 0 }
    }

    /// Returns `true` once `patience` consecutive epochs passed without improvement.
    pub fn update(&mut self, improved: bool) -> bool {
        if improved {
            self.wait = 0;
        } else {
            self.wait += 1;
        }
        self.wait >= self.patience
    }

    pub fn wait(&self) -> usize {
        self.wait
    }
}
