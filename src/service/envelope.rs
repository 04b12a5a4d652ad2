//! The `{code, message, data}` wrapper every cart endpoint responds with.

use serde::{Deserialize, Serialize};

use super::error::ServiceError;

/// Uniform response wrapper. `code == 0` signals success; a missing code counts as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Converts to a result, keeping the server message on failure.
    ///
    /// A successful envelope may carry no data; callers decide what that means.
    pub fn into_data(self) -> Result<Option<T>, ServiceError> {
        if self.code == 0 {
            Ok(self.data)
        } else {
            Err(ServiceError::Api {
                code: self.code,
                message: self.message,
            })
        }
    }

    /// Like [`into_data`](Self::into_data), with a missing payload as `T::default()`.
    pub fn into_result(self) -> Result<T, ServiceError>
    where
        T: Default,
    {
        self.into_data().map(Option::unwrap_or_default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CartListing;

    #[test]
    fn success_envelope_yields_data() {
        let envelope: Envelope<CartListing> = serde_json::from_str(
            r#"{"code":0,"message":"ok","data":{"items":[{"id":3,"sku_id":7,"title":"Tee","image":"t.png","unit_price":4.5,"quantity":2,"total_price":9.0}],"amount_total":9.0}}"#,
        )
        .unwrap();
        let listing = envelope.into_result().unwrap();
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.items[0].total_price, 9.0);
        assert!(!listing.items[0].selected);
        assert_eq!(listing.amount_total, Some(9.0));
    }

    #[test]
    fn success_without_data_defaults() {
        let envelope: Envelope<()> = serde_json::from_str(r#"{"code":0,"message":"ok"}"#).unwrap();
        assert!(envelope.into_result().is_ok());
    }

    #[test]
    fn missing_code_is_success() {
        let envelope: Envelope<()> = serde_json::from_str(r#"{"message":"deleted"}"#).unwrap();
        assert_eq!(envelope.code, 0);
        assert!(envelope.into_result().is_ok());
    }

    #[test]
    fn null_data_is_kept_apart_from_empty_data() {
        let envelope: Envelope<CartListing> =
            serde_json::from_str(r#"{"code":0,"data":null}"#).unwrap();
        assert_eq!(envelope.into_data(), Ok(None));
    }

    #[test]
    fn non_zero_code_keeps_message() {
        let envelope: Envelope<()> =
            serde_json::from_str(r#"{"code":40401,"message":"Cart item not found"}"#).unwrap();
        assert_eq!(
            envelope.into_result(),
            Err(ServiceError::api(40401, "Cart item not found"))
        );
    }
}
