//! Value Codec Module
//!
//! Converts application values to and from the store's string form.

use serde::{de::DeserializeOwned, Serialize};

// == Cacheable ==
/// A value type that can be cached under its own bucket.
///
/// `CACHE_NAME` is the bucket identifier looked up in the
/// [`RuleSet`](crate::rules::RuleSet). It is declared once per type so a rule
/// applies to every instance, and to lists of the type.
///
/// ```
/// use cache_facade::Cacheable;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Widget {
///     id: u32,
/// }
///
/// impl Cacheable for Widget {
///     const CACHE_NAME: &'static str = "Widget";
/// }
/// ```
pub trait Cacheable: Serialize + DeserializeOwned + Send + Sync + 'static {
    const CACHE_NAME: &'static str;
}

// == Value Codec ==
/// Serialization capability injected into the client.
pub trait ValueCodec: Send + Sync + 'static {
    /// Error produced by both directions.
    type Error: std::error::Error + Send + Sync + 'static;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, Self::Error>;

    fn decode<T: DeserializeOwned>(&self, payload: &str) -> Result<T, Self::Error>;
}

// == JSON Codec ==
/// Default codec storing values as JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ValueCodec for JsonCodec {
    type Error = serde_json::Error;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, Self::Error> {
        serde_json::to_string(value)
    }

    fn decode<T: DeserializeOwned>(&self, payload: &str) -> Result<T, Self::Error> {
        serde_json::from_str(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: u32,
        name: String,
    }

    #[test]
    fn test_json_single_object() {
        let codec = JsonCodec;
        let widget = Widget {
            id: 7,
            name: "gear".to_string(),
        };
        let payload = codec.encode(&widget).unwrap();
        assert_eq!(payload, r#"{"id":7,"name":"gear"}"#);
        assert_eq!(codec.decode::<Widget>(&payload).unwrap(), widget);
    }

    #[test]
    fn test_json_list_keeps_order() {
        let codec = JsonCodec;
        let widgets = vec![
            Widget {
                id: 2,
                name: "b".to_string(),
            },
            Widget {
                id: 1,
                name: "a".to_string(),
            },
        ];
        let payload = codec.encode(&widgets).unwrap();
        assert_eq!(codec.decode::<Vec<Widget>>(&payload).unwrap(), widgets);
    }

    #[test]
    fn test_json_empty_list() {
        let codec = JsonCodec;
        let payload = codec.encode::<[Widget]>(&[]).unwrap();
        assert_eq!(payload, "[]");
        assert!(codec.decode::<Vec<Widget>>(&payload).unwrap().is_empty());
    }

    #[test]
    fn test_json_malformed_payload() {
        assert!(JsonCodec.decode::<Widget>("{not json").is_err());
        assert!(JsonCodec.decode::<Vec<Widget>>(r#"{"id":1,"name":"x"}"#).is_err());
    }
}
