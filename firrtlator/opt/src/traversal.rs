//! Metadata shared by passes registered with the
//! [PassManager](crate::PassManager).

/// A pass with a stable name and a one-line description, used for
/// registration and help output.
pub trait Named {
    fn name() -> &'static str
    where
        Self: Sized;
    fn description() -> &'static str
    where
        Self: Sized;
}
