use crate::domain::event::{Amount, TransactionEvent};
use crate::error::DecodeError;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use uuid::Uuid;

/// Decodes a raw queue payload into a typed transaction event.
///
/// The wire format is permissive but validated: field names and
/// `messageType` values match case-insensitively, and trailing commas before
/// a closing brace or bracket are tolerated. `id` and `bankAccountId` are
/// required for every kind; `amount` is required (and non-negative) only for
/// Debit and Credit.
pub fn decode_event(payload: &[u8]) -> Result<TransactionEvent, DecodeError> {
    let text = String::from_utf8_lossy(payload);
    let cleaned = strip_trailing_commas(&text);
    let value: Value = serde_json::from_str(&cleaned)?;
    let map = value.as_object().ok_or(DecodeError::NotAnObject)?;

    let id = required_uuid(map, "id")?;
    let account_id = required_uuid(map, "bankAccountId")?;
    let kind = required_string(map, "messageType")?;

    let event = match kind.to_ascii_lowercase().as_str() {
        "debit" => TransactionEvent::Debit {
            id,
            account_id,
            amount: required_amount(map)?,
        },
        "credit" => TransactionEvent::Credit {
            id,
            account_id,
            amount: required_amount(map)?,
        },
        "info" => TransactionEvent::Info { id, account_id },
        "error" => TransactionEvent::Error { id, account_id },
        _ => TransactionEvent::Unsupported {
            id,
            account_id,
            kind,
        },
    };
    Ok(event)
}

/// Case-insensitive field lookup.
fn field<'a>(map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

fn required_string(map: &Map<String, Value>, name: &'static str) -> Result<String, DecodeError> {
    field(map, name)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(DecodeError::MissingField { field: name })
}

fn required_uuid(map: &Map<String, Value>, name: &'static str) -> Result<Uuid, DecodeError> {
    let value = field(map, name).ok_or(DecodeError::MissingField { field: name })?;
    let raw = value.as_str().ok_or_else(|| DecodeError::InvalidUuid {
        field: name,
        value: value.to_string(),
    })?;
    Uuid::parse_str(raw).map_err(|_| DecodeError::InvalidUuid {
        field: name,
        value: raw.to_owned(),
    })
}

fn required_amount(map: &Map<String, Value>) -> Result<Amount, DecodeError> {
    let value = field(map, "amount").ok_or(DecodeError::MissingField { field: "amount" })?;
    let decimal = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
    .ok_or_else(|| DecodeError::InvalidAmount {
        value: value.to_string(),
    })?;
    Ok(Amount::new(decimal)?)
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .ok()
        .or_else(|| Decimal::from_scientific(raw).ok())
}

/// Removes trailing commas before a closing brace or bracket so payloads
/// produced by lenient serializers still parse as strict JSON. String
/// contents are left untouched.
fn strip_trailing_commas(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars.clone().find(|n| !n.is_whitespace());
                if !matches!(next, Some('}' | ']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payload(kind: &str, id: Uuid, account_id: Uuid, amount: &str) -> String {
        format!(
            r#"{{"id":"{id}","messageType":"{kind}","bankAccountId":"{account_id}","amount":{amount}}}"#
        )
    }

    #[test]
    fn test_decodes_debit() {
        let id = Uuid::new_v4();
        let account_id = Uuid::new_v4();
        let event = decode_event(payload("Debit", id, account_id, "30.5").as_bytes()).unwrap();

        assert_eq!(
            event,
            TransactionEvent::Debit {
                id,
                account_id,
                amount: Amount::new(dec!(30.5)).unwrap(),
            }
        );
    }

    #[test]
    fn test_field_names_are_case_insensitive() {
        let id = Uuid::new_v4();
        let account_id = Uuid::new_v4();
        let raw = format!(
            r#"{{"ID":"{id}","MessageType":"Credit","BANKACCOUNTID":"{account_id}","Amount":1.0}}"#
        );

        let event = decode_event(raw.as_bytes()).unwrap();
        assert_eq!(event.account_id(), account_id);
        assert!(matches!(event, TransactionEvent::Credit { .. }));
    }

    #[test]
    fn test_enum_values_are_case_insensitive() {
        let id = Uuid::new_v4();
        let account_id = Uuid::new_v4();

        let lower = decode_event(payload("debit", id, account_id, "1.0").as_bytes()).unwrap();
        let mixed = decode_event(payload("DeBiT", id, account_id, "1.0").as_bytes()).unwrap();
        assert_eq!(lower, mixed);
    }

    #[test]
    fn test_tolerates_trailing_commas() {
        let id = Uuid::new_v4();
        let account_id = Uuid::new_v4();
        let raw = format!(
            r#"{{"id":"{id}","messageType":"Info","bankAccountId":"{account_id}",}}"#
        );

        let event = decode_event(raw.as_bytes()).unwrap();
        assert!(matches!(event, TransactionEvent::Info { .. }));
    }

    #[test]
    fn test_commas_inside_strings_survive() {
        let cleaned = strip_trailing_commas(r#"{"a":"x,}","b":1,}"#);
        assert_eq!(cleaned, r#"{"a":"x,}","b":1}"#);
    }

    #[test]
    fn test_amount_as_numeric_string() {
        let id = Uuid::new_v4();
        let account_id = Uuid::new_v4();
        let event = decode_event(payload("Credit", id, account_id, r#""12.25""#).as_bytes()).unwrap();

        assert!(matches!(
            event,
            TransactionEvent::Credit { amount, .. } if amount.value() == dec!(12.25)
        ));
    }

    #[test]
    fn test_missing_account_id_fails() {
        let raw = format!(
            r#"{{"id":"{}","messageType":"Debit","amount":1.0}}"#,
            Uuid::new_v4()
        );

        let err = decode_event(raw.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingField {
                field: "bankAccountId"
            }
        ));
    }

    #[test]
    fn test_missing_amount_fails_for_debit_only() {
        let id = Uuid::new_v4();
        let account_id = Uuid::new_v4();
        let without_amount =
            format!(r#"{{"id":"{id}","messageType":"Debit","bankAccountId":"{account_id}"}}"#);

        let err = decode_event(without_amount.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { field: "amount" }));

        // Info does not carry an amount at all.
        let info = format!(r#"{{"id":"{id}","messageType":"Info","bankAccountId":"{account_id}"}}"#);
        assert!(decode_event(info.as_bytes()).is_ok());
    }

    #[test]
    fn test_negative_amount_fails() {
        let raw = payload("Debit", Uuid::new_v4(), Uuid::new_v4(), "-5.0");
        let err = decode_event(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Amount(_)));
    }

    #[test]
    fn test_invalid_uuid_fails() {
        let raw = format!(
            r#"{{"id":"not-a-uuid","messageType":"Debit","bankAccountId":"{}","amount":1.0}}"#,
            Uuid::new_v4()
        );

        let err = decode_event(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidUuid { field: "id", .. }));
    }

    #[test]
    fn test_unknown_kind_becomes_unsupported() {
        let id = Uuid::new_v4();
        let account_id = Uuid::new_v4();
        let raw =
            format!(r#"{{"id":"{id}","messageType":"Transfer","bankAccountId":"{account_id}"}}"#);

        let event = decode_event(raw.as_bytes()).unwrap();
        assert!(matches!(
            event,
            TransactionEvent::Unsupported { kind, .. } if kind == "Transfer"
        ));
    }

    #[test]
    fn test_garbage_payload_fails() {
        assert!(matches!(
            decode_event(b"definitely not json"),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            decode_event(b"[1,2,3]"),
            Err(DecodeError::NotAnObject)
        ));
    }
}
