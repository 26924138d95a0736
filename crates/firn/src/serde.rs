use serde::{Deserialize, Deserializer, Serializer};

/// Serialize a [`FlakeId`] as a decimal string.
///
/// JSON and JavaScript consumers cannot represent a full 64-bit integer
/// without precision loss, so ids cross API boundaries as strings.
///
/// # Example
///
/// ```
/// use firn::FlakeId;
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Article {
///     #[serde(with = "firn::as_decimal_str")]
///     id: FlakeId,
/// }
///
/// let article = Article { id: FlakeId::from_raw(12345) };
/// assert_eq!(serde_json::to_string(&article).unwrap(), r#"{"id":"12345"}"#);
/// ```
///
/// [`FlakeId`]: crate::FlakeId
pub mod as_decimal_str {
    use super::{Deserialize, Deserializer, Serializer};
    use crate::FlakeId;

    /// Serialize an id via its `Display` (decimal) form.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &FlakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(id)
    }

    /// Deserialize an id from its decimal string form.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a valid decimal `u64`
    pub fn deserialize<'de, D>(d: D) -> Result<FlakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        let raw: u64 = s.parse().map_err(serde::de::Error::custom)?;
        Ok(FlakeId::from_raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use crate::FlakeId;

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Row {
        #[serde(with = "crate::as_decimal_str")]
        id: FlakeId,
    }

    #[test]
    fn round_trips_through_a_decimal_string() {
        let row = Row {
            id: FlakeId::from_parts(123_456, 3, 7, 42),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, format!(r#"{{"id":"{}"}}"#, row.id));
        assert_eq!(serde_json::from_str::<Row>(&json).unwrap(), row);
    }

    #[test]
    fn rejects_non_numeric_strings() {
        assert!(serde_json::from_str::<Row>(r#"{"id":"not-a-number"}"#).is_err());
    }

    #[test]
    fn native_derive_uses_the_raw_integer() {
        let id = FlakeId::from_raw(98765);
        assert_eq!(serde_json::to_string(&id).unwrap(), "98765");
        assert_eq!(serde_json::from_str::<FlakeId>("98765").unwrap(), id);
    }
}
