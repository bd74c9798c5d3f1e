/// Data models for casting-service
///
/// Records as they are stored and returned, plus the request bodies that
/// create or patch them.
pub mod actor;
pub mod movie;
pub mod release_date;

pub use actor::{Actor, ActorPatch, NewActor};
pub use movie::{Movie, MoviePatch, NewMovie};

use crate::db::RepositoryError;
use serde::{Deserialize, Deserializer};

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), RepositoryError> {
    if value.trim().is_empty() {
        return Err(RepositoryError::InvalidInput(format!("{} must not be blank", field)));
    }
    Ok(())
}

/// Patch field where an explicit `null` (`Some(None)`) clears the value and
/// an absent field (`None`) leaves it alone
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
