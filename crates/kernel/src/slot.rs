use crate::error::KernelError;

/// A scene reference that starts out unresolved and is filled in exactly
/// once, when its asset finishes loading.
///
/// The scheduler checks every slot each frame; a pending slot means "skip
/// this step", never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Pending,
    Ready(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T> Slot<T> {
    /// Fill the slot. A second resolve is rejected and the first value kept.
    pub fn resolve(&mut self, value: T, what: &'static str) -> Result<(), KernelError> {
        if self.is_ready() {
            return Err(KernelError::AlreadyResolved(what));
        }
        *self = Self::Ready(value);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            Self::Pending => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(v) => Some(v),
            Self::Pending => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_pending() {
        let slot: Slot<u32> = Slot::default();
        assert!(!slot.is_ready());
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn resolves_once() {
        let mut slot = Slot::Pending;
        slot.resolve(1, "thing").unwrap();
        assert_eq!(slot.get(), Some(&1));

        let err = slot.resolve(2, "thing").unwrap_err();
        assert!(matches!(err, KernelError::AlreadyResolved("thing")));
        assert_eq!(slot.get(), Some(&1));
    }
}
