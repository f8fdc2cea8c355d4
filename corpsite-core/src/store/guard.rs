//! Rollback for request futures dropped before they settle

/// Runs `on_drop` unless [`DropGuard::disarm`] was called first
///
/// Request methods flip state to "in flight" before awaiting the network. A
/// caller that drops the future midway (a closed view, `tokio::time::timeout`,
/// a losing `select!` branch) would otherwise leave that state behind for good.
pub(crate) struct DropGuard<F: FnOnce()> {
    on_drop: Option<F>,
}

impl<F: FnOnce()> DropGuard<F> {
    pub(crate) fn new(on_drop: F) -> Self {
        Self {
            on_drop: Some(on_drop),
        }
    }

    /// The request settled normally; nothing to undo
    pub(crate) fn disarm(mut self) {
        self.on_drop = None;
    }
}

impl<F: FnOnce()> Drop for DropGuard<F> {
    fn drop(&mut self) {
        if let Some(on_drop) = self.on_drop.take() {
            on_drop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_runs_on_drop_unless_disarmed() {
        let rolled_back = Cell::new(0);

        drop(DropGuard::new(|| rolled_back.set(rolled_back.get() + 1)));
        assert_eq!(rolled_back.get(), 1);

        DropGuard::new(|| rolled_back.set(rolled_back.get() + 1)).disarm();
        assert_eq!(rolled_back.get(), 1);
    }
}
