//! Macros for building condition lists.

/// Build the `Vec<Condition<M>>` taken by statement builders, relations and connectors.
///
/// Every argument is converted with `Condition::from`, so where conditions, join
/// conditions and collection preloads can be mixed in one list.
///
/// ```ignore
/// let products = Query::<Product>::new(
///     executor,
///     conditions![Product::INT.is().eq(1), Product::BOOL.is().eq(true)],
/// )
/// .find()?;
/// ```
#[macro_export]
macro_rules! conditions {
    ($($condition:expr),* $(,)?) => {
        vec![$($crate::condition::Condition::from($condition)),*]
    };
}
