/// Runs a closure when dropped.
///
/// Used to tie cleanup to the lifetime of a spawned task: the closure runs
/// whether the task returns normally, fails, or unwinds from a panic in a
/// command handler.
///
/// # Examples
///
/// ```
/// use rusty_console::utils::guard::OnDrop;
///
/// let mut released = false;
/// {
///     let _guard = OnDrop::new(|| released = true);
/// }
/// assert!(released);
/// ```
pub struct OnDrop<F: FnOnce()> {
    on_drop: Option<F>,
}

impl<F: FnOnce()> OnDrop<F> {
    pub fn new(f: F) -> Self {
        Self { on_drop: Some(f) }
    }
}

impl<F: FnOnce()> Drop for OnDrop<F> {
    fn drop(&mut self) {
        if let Some(f) = self.on_drop.take() {
            f()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_runs_on_drop() {
        let hits = Cell::new(0);
        {
            let _guard = OnDrop::new(|| hits.set(hits.get() + 1));
            assert_eq!(hits.get(), 0);
        }
        assert_eq!(hits.get(), 1);
    }
}
