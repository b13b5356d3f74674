//! Discovery document and JSON Web Key Set models.

pub mod document;
pub mod jwk;

pub use document::*;
pub use jwk::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::ContentError};

/// Parses `body` into `T`, recording the member path of the first failure.
pub(crate) fn parse_json<T>(body: &str) -> Result<T, ContentError>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_str(body);
	let value = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| ContentError::Malformed { source })?;

	de.end().map_err(|source| ContentError::TrailingCharacters { source })?;

	Ok(value)
}
