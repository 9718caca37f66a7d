//! Entity repositories.
//!
//! Every operation takes `&impl GenericClient`, so it runs on whatever
//! connection or transaction the caller is holding.

mod company;
mod job;
mod user;

pub use company::{Company, CompanyUpdate};
pub use job::{Job, JobDetail, JobListing, JobUpdate, NewJob};
pub use user::{User, UserDetail, UserUpdate};

use serde::{Deserialize, Deserializer};

/// Deserialize a present field (including `null`) as `Some(..)`.
///
/// Combined with `#[serde(default)]`, an absent field stays `None`, so
/// `Option<Option<T>>` can tell "leave unchanged" from "set to NULL".
pub(crate) fn present<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
