//! Soft lifecycle shared by retireable dictionary entities.

/// An entity that can be retired (soft-deleted) and brought back.
///
/// Retiring does not validate the reason; callers that require a reason
/// check it before calling [`Retireable::mark_retired`].
///
/// # Examples
///
/// ```
/// use dictionary_types::{ConceptClass, Retireable};
///
/// let mut class = ConceptClass::new("Misc");
/// class.mark_retired("duplicate of Finding");
/// assert!(class.is_retired());
/// assert_eq!(class.retire_reason(), Some("duplicate of Finding"));
///
/// class.mark_unretired();
/// assert!(!class.is_retired());
/// assert_eq!(class.retire_reason(), None);
/// ```
pub trait Retireable {
    /// Returns true if the entity is retired.
    fn is_retired(&self) -> bool;

    /// Returns the recorded retire reason, if any.
    fn retire_reason(&self) -> Option<&str>;

    /// Marks the entity retired with the given reason.
    fn mark_retired(&mut self, reason: &str);

    /// Clears the retired flag and the retire reason.
    fn mark_unretired(&mut self);
}

/// Implements [`Retireable`] for structs with `retired` and `retire_reason` fields.
macro_rules! impl_retireable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Retireable for $ty {
                fn is_retired(&self) -> bool {
                    self.retired
                }

                fn retire_reason(&self) -> Option<&str> {
                    self.retire_reason.as_deref()
                }

                fn mark_retired(&mut self, reason: &str) {
                    self.retired = true;
                    self.retire_reason = Some(reason.to_string());
                }

                fn mark_unretired(&mut self) {
                    self.retired = false;
                    self.retire_reason = None;
                }
            }
        )+
    };
}

pub(crate) use impl_retireable;
