//! Access to the remote session-listing service.
//!
//! Sessions are enrichment data: a failed fetch degrades to an empty list
//! with a reason instead of an error.

mod client;

pub use client::{ClientError, SessionClient};

/// Outcome of a best-effort fetch.
///
/// Callers have to match on `Degraded` explicitly; a failure never hides
/// inside an empty `Ok`.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Ok(T),
    Degraded(String),
}

impl<T> Fetched<T> {
    /// The fetched value, or `T::default()` with the reason when degraded.
    pub fn into_parts(self) -> (T, Option<String>)
    where
        T: Default,
    {
        match self {
            Self::Ok(value) => (value, None),
            Self::Degraded(reason) => (T::default(), Some(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_yields_default_and_reason() {
        let fetched: Fetched<Vec<u8>> = Fetched::Degraded("offline".to_string());
        assert_eq!(fetched.into_parts(), (vec![], Some("offline".to_string())));
    }

    #[test]
    fn ok_carries_no_reason() {
        let fetched = Fetched::Ok(vec![1u8]);
        assert_eq!(fetched.into_parts(), (vec![1u8], None));
    }
}
