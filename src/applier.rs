// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{error::Result, value::OwnedTuple};

/// Composes an `Upsert` delta with its lower-LSN base tuple, right-folded
/// over the delta chain from oldest to newest.
///
/// Specified only at this interface: the algebra is schema-specific and
/// belongs to the caller. Must be total and associative enough that folding
/// a chain of deltas over a base yields a unique result.
pub trait UpsertApplier: Send + Sync {
    /// Applies `delta` on top of `base`, producing a new owned tuple.
    fn apply(&self, delta: &crate::value::Statement, base: &OwnedTuple) -> Result<OwnedTuple>;
}

/// A demo applier treating the value as a little-endian `u64` counter and
/// the delta payload as a signed increment (also little-endian, sign
/// carried by the high bit being unused — deltas are non-negative in this
/// demo, matching the scenario tests' `UPSERT(+n)` notation).
///
/// Used by the integration tests; not exposed as the crate's only applier,
/// since this algebra is always caller-supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterApplier;

impl UpsertApplier for CounterApplier {
    fn apply(&self, delta: &crate::value::Statement, base: &OwnedTuple) -> Result<OwnedTuple> {
        let delta_bytes = delta.value.as_deref().ok_or(crate::error::Error::UpsertFailure)?;
        let delta_amount = decode_u64(delta_bytes).ok_or(crate::error::Error::UpsertFailure)?;
        let base_amount = decode_u64(&base.value).ok_or(crate::error::Error::UpsertFailure)?;

        let sum = base_amount
            .checked_add(delta_amount)
            .ok_or(crate::error::Error::UpsertFailure)?;

        Ok(OwnedTuple {
            key: base.key.clone(),
            value: sum.to_le_bytes().to_vec().into(),
        })
    }
}

fn decode_u64(bytes: &[u8]) -> Option<u64> {
    let array: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_le_bytes(array))
}

/// Builds an `Upsert` delta statement carrying a `u64` increment, for use
/// with [`CounterApplier`] in tests.
#[must_use]
pub fn counter_delta(amount: u64) -> Vec<u8> {
    amount.to_le_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        slice::Slice,
        value::{Statement, StatementType},
    };
    use test_log::test;

    #[test]
    fn applies_increment_to_base() {
        let base = OwnedTuple {
            key: Slice::from("k"),
            value: 10u64.to_le_bytes().to_vec().into(),
        };
        let delta = Statement::new(StatementType::Upsert, "k", Some(counter_delta(1).into()), 50);

        let result = CounterApplier.apply(&delta, &base).expect("apply");
        assert_eq!(decode_u64(&result.value), Some(11));
    }

    #[test]
    fn rejects_malformed_delta() {
        let base = OwnedTuple {
            key: Slice::from("k"),
            value: 10u64.to_le_bytes().to_vec().into(),
        };
        let delta = Statement::new(StatementType::Upsert, "k", Some("garbage".into()), 50);

        assert!(CounterApplier.apply(&delta, &base).is_err());
    }
}
