//! # Gateway Callbacks
//!
//! Inbound notifications from Daraja: STK push results and C2B
//! confirmations. The gateway retries anything that is not acknowledged
//! quickly, so receipt always succeeds; recognizing the payload is best
//! effort and only feeds a [`CallbackHandler`].
//!
//! Payload authenticity is NOT verified.

use relay_core::Acknowledgement;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Characters of the payload written to the log
pub const CALLBACK_LOG_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("Missing field in callback: {0}")]
    MissingField(&'static str),

    #[error("Callback handler failed: {0}")]
    Handler(String),
}

/// Parsed `Body.stkCallback` of an STK push result
#[derive(Debug, Clone)]
pub struct StkCallbackData {
    pub merchant_request_id: Option<String>,
    pub checkout_request_id: String,
    pub result_code: i64,
    pub result_desc: String,
    /// `CallbackMetadata.Item` flattened to name -> value
    pub metadata: HashMap<String, Value>,
}

impl StkCallbackData {
    pub fn from_value(payload: &Value) -> Result<Self, CallbackError> {
        let callback = payload
            .pointer("/Body/stkCallback")
            .ok_or(CallbackError::MissingField("Body.stkCallback"))?;

        let checkout_request_id = text_field(callback, "CheckoutRequestID")
            .ok_or(CallbackError::MissingField("CheckoutRequestID"))?;

        let result_code = callback
            .get("ResultCode")
            .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .ok_or(CallbackError::MissingField("ResultCode"))?;

        let metadata = callback
            .pointer("/CallbackMetadata/Item")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let name = item.get("Name")?.as_str()?;
                        let value = item.get("Value").cloned().unwrap_or(Value::Null);
                        Some((name.to_string(), value))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            merchant_request_id: text_field(callback, "MerchantRequestID"),
            checkout_request_id,
            result_code,
            result_desc: text_field(callback, "ResultDesc").unwrap_or_default(),
            metadata,
        })
    }

    /// Check if the customer completed the payment
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    pub fn receipt_number(&self) -> Option<&str> {
        self.metadata.get("MpesaReceiptNumber").and_then(Value::as_str)
    }

    pub fn amount(&self) -> Option<f64> {
        self.metadata.get("Amount").and_then(Value::as_f64)
    }

    pub fn phone_number(&self) -> Option<String> {
        self.metadata.get("PhoneNumber").and_then(value_to_text)
    }
}

/// Parsed C2B confirmation
#[derive(Debug, Clone)]
pub struct C2bConfirmationData {
    pub trans_id: String,
    pub transaction_type: Option<String>,
    pub trans_amount: Option<String>,
    pub msisdn: Option<String>,
    pub bill_ref_number: Option<String>,
    pub business_short_code: Option<String>,
}

impl C2bConfirmationData {
    pub fn from_value(payload: &Value) -> Result<Self, CallbackError> {
        let trans_id =
            text_field(payload, "TransID").ok_or(CallbackError::MissingField("TransID"))?;

        Ok(Self {
            trans_id,
            transaction_type: text_field(payload, "TransactionType"),
            trans_amount: text_field(payload, "TransAmount"),
            msisdn: text_field(payload, "MSISDN"),
            bill_ref_number: text_field(payload, "BillRefNumber"),
            business_short_code: text_field(payload, "BusinessShortCode"),
        })
    }
}

fn text_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key).and_then(value_to_text)
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Callback handler trait
///
/// Implement this trait to act on gateway notifications. Every method
/// defaults to logging.
#[allow(unused_variables)]
pub trait CallbackHandler: Send + Sync {
    /// Called for an STK push result (success or failure)
    fn on_stk_result(&self, data: StkCallbackData) -> Result<(), CallbackError> {
        if data.is_success() {
            info!(
                "STK payment completed: checkout={}, receipt={:?}, amount={:?}",
                data.checkout_request_id,
                data.receipt_number(),
                data.amount()
            );
        } else {
            warn!(
                "STK payment not completed: checkout={}, code={}, desc={}",
                data.checkout_request_id, data.result_code, data.result_desc
            );
        }
        Ok(())
    }

    /// Called for a C2B confirmation
    fn on_c2b_confirmation(&self, data: C2bConfirmationData) -> Result<(), CallbackError> {
        info!(
            "C2B confirmation: trans_id={}, amount={:?}, bill_ref={:?}",
            data.trans_id, data.trans_amount, data.bill_ref_number
        );
        Ok(())
    }

    /// Called for anything else
    fn on_unrecognized(&self, payload: &Value) -> Result<(), CallbackError> {
        debug!("Unrecognized callback payload");
        Ok(())
    }
}

/// Default handler (just logs notifications)
pub struct LoggingCallbackHandler;

impl CallbackHandler for LoggingCallbackHandler {}

/// Route a notification to the matching handler method
pub fn dispatch_callback(
    handler: &dyn CallbackHandler,
    payload: &Value,
) -> Result<(), CallbackError> {
    if payload.pointer("/Body/stkCallback").is_some() {
        return handler.on_stk_result(StkCallbackData::from_value(payload)?);
    }
    if payload.get("TransID").is_some() {
        return handler.on_c2b_confirmation(C2bConfirmationData::from_value(payload)?);
    }
    handler.on_unrecognized(payload)
}

/// Accept a raw notification body.
///
/// Logs a truncated copy, hands recognizable payloads to `handler`, and
/// always returns the success acknowledgement.
pub fn receive_callback(handler: &dyn CallbackHandler, body: &[u8]) -> Acknowledgement {
    let parsed = serde_json::from_slice::<Value>(body).ok();

    let preview = match &parsed {
        Some(value) => value.to_string(),
        None => String::from_utf8_lossy(body).into_owned(),
    };
    info!(
        payload = truncate_chars(&preview, CALLBACK_LOG_LIMIT),
        "Received gateway callback"
    );

    match parsed {
        Some(payload) => {
            if let Err(e) = dispatch_callback(handler, &payload) {
                warn!("Callback not processed: {}", e);
            }
        }
        None => warn!("Callback body is not valid JSON"),
    }

    Acknowledgement::accepted()
}

/// First `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn stk_success() -> Value {
        json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": "ws_CO_191220191020363925",
                    "ResultCode": 0,
                    "ResultDesc": "The service request is processed successfully.",
                    "CallbackMetadata": {
                        "Item": [
                            {"Name": "Amount", "Value": 100.00},
                            {"Name": "MpesaReceiptNumber", "Value": "NLJ7RT61SV"},
                            {"Name": "Balance"},
                            {"Name": "TransactionDate", "Value": 20191219102115u64},
                            {"Name": "PhoneNumber", "Value": 254708374149u64}
                        ]
                    }
                }
            }
        })
    }

    #[test]
    fn test_parse_stk_success() {
        let data = StkCallbackData::from_value(&stk_success()).unwrap();

        assert!(data.is_success());
        assert_eq!(data.checkout_request_id, "ws_CO_191220191020363925");
        assert_eq!(data.receipt_number(), Some("NLJ7RT61SV"));
        assert_eq!(data.amount(), Some(100.0));
        assert_eq!(data.phone_number().as_deref(), Some("254708374149"));
        assert_eq!(data.metadata.get("Balance"), Some(&Value::Null));
    }

    #[test]
    fn test_parse_stk_cancelled() {
        let payload = json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "8555-67195-1",
                    "CheckoutRequestID": "ws_CO_27072017151044001",
                    "ResultCode": 1032,
                    "ResultDesc": "Request cancelled by user"
                }
            }
        });
        let data = StkCallbackData::from_value(&payload).unwrap();

        assert!(!data.is_success());
        assert_eq!(data.result_code, 1032);
        assert!(data.metadata.is_empty());
        assert!(data.receipt_number().is_none());
    }

    #[test]
    fn test_parse_c2b_confirmation() {
        let payload = json!({
            "TransactionType": "Pay Bill",
            "TransID": "RKTQDM7W6S",
            "TransAmount": "10",
            "BusinessShortCode": "600638",
            "BillRefNumber": "invoice008",
            "MSISDN": "2547 ***** 126"
        });
        let data = C2bConfirmationData::from_value(&payload).unwrap();

        assert_eq!(data.trans_id, "RKTQDM7W6S");
        assert_eq!(data.trans_amount.as_deref(), Some("10"));
        assert_eq!(data.bill_ref_number.as_deref(), Some("invoice008"));
    }

    #[test]
    fn test_dispatch_callback() {
        struct TestHandler {
            stk: AtomicBool,
            unrecognized: AtomicBool,
        }

        impl CallbackHandler for TestHandler {
            fn on_stk_result(&self, _data: StkCallbackData) -> Result<(), CallbackError> {
                self.stk.store(true, Ordering::SeqCst);
                Ok(())
            }

            fn on_unrecognized(&self, _payload: &Value) -> Result<(), CallbackError> {
                self.unrecognized.store(true, Ordering::SeqCst);
                Ok(())
            }
        }

        let handler = TestHandler {
            stk: AtomicBool::new(false),
            unrecognized: AtomicBool::new(false),
        };

        dispatch_callback(&handler, &stk_success()).unwrap();
        assert!(handler.stk.load(Ordering::SeqCst));
        assert!(!handler.unrecognized.load(Ordering::SeqCst));

        dispatch_callback(&handler, &json!({})).unwrap();
        assert!(handler.unrecognized.load(Ordering::SeqCst));
    }

    #[test]
    fn test_malformed_stk_is_an_error() {
        let payload = json!({"Body": {"stkCallback": {"ResultCode": 0}}});
        assert!(matches!(
            dispatch_callback(&LoggingCallbackHandler, &payload),
            Err(CallbackError::MissingField("CheckoutRequestID"))
        ));
    }

    #[test]
    fn test_receive_always_acknowledges() {
        struct FailingHandler;

        impl CallbackHandler for FailingHandler {
            fn on_unrecognized(&self, _payload: &Value) -> Result<(), CallbackError> {
                Err(CallbackError::Handler("boom".into()))
            }
        }

        let expected = Acknowledgement::accepted();
        assert_eq!(receive_callback(&FailingHandler, b"{}"), expected);
        assert_eq!(receive_callback(&FailingHandler, b"not json"), expected);
        assert_eq!(receive_callback(&FailingHandler, b""), expected);
        assert_eq!(
            receive_callback(&LoggingCallbackHandler, stk_success().to_string().as_bytes()),
            expected
        );
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("héllo", 2), "hé");

        let long = "x".repeat(CALLBACK_LOG_LIMIT + 500);
        assert_eq!(truncate_chars(&long, CALLBACK_LOG_LIMIT).len(), CALLBACK_LOG_LIMIT);
    }
}
