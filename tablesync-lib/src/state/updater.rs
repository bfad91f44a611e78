//! Value-or-function updates.

use std::fmt;

/// An update to a piece of table state.
///
/// Grid callbacks either hand over the new value outright or a function that
/// derives it from the current one. Both forms are applied the same way
/// through [`Updater::apply`].
///
/// # Example
///
/// ```
/// use tablesync_lib::state::{PaginationState, Updater};
///
/// let next: Updater<PaginationState> = Updater::func(|p: &PaginationState| PaginationState {
///     page_index: p.page_index + 1,
///     ..*p
/// });
/// assert_eq!(next.apply(&PaginationState::default()).page_index, 1);
/// ```
pub enum Updater<T> {
    /// Replace the current value.
    Value(T),
    /// Derive the new value from the current one.
    Func(Box<dyn FnOnce(&T) -> T + Send>),
}

impl<T> Updater<T> {
    /// Wraps an update function.
    pub fn func(f: impl FnOnce(&T) -> T + Send + 'static) -> Self {
        Self::Func(Box::new(f))
    }

    /// Computes the new value.
    pub fn apply(self, current: &T) -> T {
        match self {
            Self::Value(value) => value,
            Self::Func(f) => f(current),
        }
    }
}

impl<T> From<T> for Updater<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Updater<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Func(_) => f.write_str("Func(..)"),
        }
    }
}
