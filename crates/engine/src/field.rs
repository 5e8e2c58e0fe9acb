//! Three-state inputs for figures the operator may overwrite.

use serde::{Deserialize, Serialize};

/// How a figure reaches the calculator.
///
/// ```rust
/// use engine::{FieldInput, FieldSource, Money};
///
/// let resolved = FieldInput::UserOverridden(Money::from_units(5)).resolve(|| Money::ZERO);
/// assert_eq!(resolved.value, Money::from_units(5));
/// assert_eq!(resolved.source, FieldSource::User);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum FieldInput<T> {
    /// Nothing supplied: the engine derives the value from the transactions.
    #[default]
    Unset,
    /// Derived upstream, e.g. read from a stored summary row.
    Derived(T),
    /// Typed in by the operator.
    UserOverridden(T),
}

/// Where a resolved figure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Engine,
    Upstream,
    User,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: FieldSource,
}

impl<T> FieldInput<T> {
    /// Resolves the field, calling `derive` only when it is `Unset`.
    pub fn resolve(self, derive: impl FnOnce() -> T) -> Resolved<T> {
        match self {
            Self::Unset => Resolved {
                value: derive(),
                source: FieldSource::Engine,
            },
            Self::Derived(value) => Resolved {
                value,
                source: FieldSource::Upstream,
            },
            Self::UserOverridden(value) => Resolved {
                value,
                source: FieldSource::User,
            },
        }
    }

    /// Like [`resolve`](Self::resolve) with a fallible derivation.
    pub fn try_resolve<E>(self, derive: impl FnOnce() -> Result<T, E>) -> Result<Resolved<T>, E> {
        match self {
            Self::Unset => Ok(Resolved {
                value: derive()?,
                source: FieldSource::Engine,
            }),
            Self::Derived(value) => Ok(Resolved {
                value,
                source: FieldSource::Upstream,
            }),
            Self::UserOverridden(value) => Ok(Resolved {
                value,
                source: FieldSource::User,
            }),
        }
    }

    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Money;

    #[test]
    fn unset_derives() {
        let resolved = FieldInput::<Money>::Unset.resolve(|| Money::new(42));
        assert_eq!(resolved.value, Money::new(42));
        assert_eq!(resolved.source, FieldSource::Engine);
    }

    #[test]
    fn derived_is_kept_as_is() {
        let mut called = false;
        let resolved = FieldInput::Derived(Money::new(7)).resolve(|| {
            called = true;
            Money::ZERO
        });
        assert!(!called);
        assert_eq!(resolved.value, Money::new(7));
        assert_eq!(resolved.source, FieldSource::Upstream);
    }

    #[test]
    fn try_resolve_propagates_errors_only_when_deriving() {
        let failing = || Err::<Money, &str>("boom");
        assert_eq!(FieldInput::Unset.try_resolve(failing), Err("boom"));
        let resolved = FieldInput::UserOverridden(Money::new(1))
            .try_resolve(failing)
            .unwrap();
        assert_eq!(resolved.source, FieldSource::User);
    }

    #[test]
    fn serde_shape() {
        let json = serde_json::to_string(&FieldInput::UserOverridden(Money::new(150))).unwrap();
        assert_eq!(json, r#"{"state":"user_overridden","value":"1.50"}"#);
        let unset: FieldInput<Money> = serde_json::from_str(r#"{"state":"unset"}"#).unwrap();
        assert!(unset.is_unset());
    }
}
