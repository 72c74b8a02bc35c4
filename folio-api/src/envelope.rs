use serde::de::DeserializeOwned;

use crate::Error;

/// `status` value of a successful envelope
pub const STATUS_OK: i64 = 100;

/// Wrapper the backend puts around most response bodies
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct Envelope<T> {
    pub status: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Envelope<T> {
        Envelope {
            status: STATUS_OK,
            message: None,
            data: Some(data),
        }
    }
}

fn is_envelope(v: &serde_json::Value) -> bool {
    v.as_object().map_or(false, |o| {
        o.get("status").map_or(false, |s| s.is_i64())
            && (o.contains_key("data") || o.contains_key("message"))
    })
}

/// Decodes a successful HTTP body, unwrapping the envelope if there is one.
///
/// An envelope with a non-success status is a business error and becomes
/// `Error::Server` with the server-provided message.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    let value: serde_json::Value = match body.is_empty() {
        true => serde_json::Value::Null,
        false => serde_json::from_slice(body)
            .map_err(|e| Error::MalformedResponse(format!("body is not json: {e}")))?,
    };
    let value = match is_envelope(&value) {
        false => value,
        true => {
            let env: Envelope<serde_json::Value> = serde_json::from_value(value)
                .map_err(|e| Error::MalformedResponse(format!("bad envelope: {e}")))?;
            if env.status != STATUS_OK {
                return Err(Error::Server {
                    status: env.status,
                    message: env.message.unwrap_or_default(),
                });
            }
            env.data.unwrap_or(serde_json::Value::Null)
        }
    };
    serde_json::from_value(value).map_err(|e| Error::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PostId;

    #[test]
    fn unwraps_success() {
        let id: PostId = decode_body(br#"{"status": 100, "message": "ok", "data": 4}"#).unwrap();
        assert_eq!(id, PostId(4));
        let () = decode_body(br#"{"status": 100, "data": null}"#).unwrap();
        let () = decode_body(b"").unwrap();
    }

    #[test]
    fn bare_bodies_pass_through() {
        let v: Vec<i64> = decode_body(b"[1, 2]").unwrap();
        assert_eq!(v, vec![1, 2]);
        // a post has a string status, which is not an envelope
        let v: serde_json::Value = decode_body(br#"{"status": "PUBLISHED", "data": 1}"#).unwrap();
        assert_eq!(v["status"], "PUBLISHED");
    }

    #[test]
    fn business_errors_carry_message() {
        let err = decode_body::<()>(br#"{"status": 101, "message": "post not found"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            Error::Server {
                status: 101,
                message: String::from("post not found")
            }
        );
        assert!(matches!(
            decode_body::<PostId>(b"<html>"),
            Err(Error::MalformedResponse(_))
        ));
    }
}
