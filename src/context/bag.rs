//! The set of contextual fields carried by a call-context.

use crate::context::masking::mask_phone;
use crate::record::{Attr, Value};

pub const USER_ID_KEY: &str = "user_id";
pub const PHONE_KEY: &str = "phone";
pub const GATE_KEY: &str = "sms_gate";
pub const MESSAGE_KEY: &str = "message";
pub const REQUEST_ID_KEY: &str = "request_id";

/// Contextual fields attached to a request.
///
/// Zero and empty values mean "unset". Merging is right-biased and partial:
/// only fields set on the incoming bag overwrite the existing ones. The phone
/// number is masked on the way in, so the bag never holds it in clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextBag {
    user_id: i64,
    phone: String,
    sms_gate: String,
    message: String,
    request_id: String,
    extra: Vec<Attr>,
}

impl ContextBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, id: i64) -> Self {
        self.user_id = id;
        self
    }

    /// Store the masked form of `phone`.
    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = mask_phone(phone);
        self
    }

    pub fn with_sms_gate(mut self, gate: impl Into<String>) -> Self {
        self.sms_gate = gate.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = id.into();
        self
    }

    /// Set an arbitrary field.
    ///
    /// Keys naming a built-in field always route to that field, whatever the
    /// value's type: `phone` is rendered and masked, the string fields store
    /// the rendered value, and a non-integer `user_id` is ignored. Other keys
    /// replace an existing extra field in place or are appended. Empty
    /// strings and numeric zeros are ignored.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        if key.is_empty() || is_unset(&value) {
            return self;
        }

        match key.as_str() {
            USER_ID_KEY => {
                return match integer_id(&value) {
                    Some(id) => self.with_user_id(id),
                    None => self,
                };
            }
            PHONE_KEY => return self.with_phone(&value.to_string()),
            GATE_KEY => return self.with_sms_gate(value.to_string()),
            MESSAGE_KEY => return self.with_message(value.to_string()),
            REQUEST_ID_KEY => return self.with_request_id(value.to_string()),
            _ => {}
        }

        upsert(&mut self.extra, Attr { key, value });
        self
    }

    pub fn user_id(&self) -> Option<i64> {
        (self.user_id != 0).then_some(self.user_id)
    }

    pub fn phone(&self) -> Option<&str> {
        non_empty(&self.phone)
    }

    pub fn sms_gate(&self) -> Option<&str> {
        non_empty(&self.sms_gate)
    }

    pub fn message(&self) -> Option<&str> {
        non_empty(&self.message)
    }

    pub fn request_id(&self) -> Option<&str> {
        non_empty(&self.request_id)
    }

    pub fn extra(&self) -> &[Attr] {
        &self.extra
    }

    /// Right-biased partial merge: fields set on `other` win, the rest are
    /// kept from `self`.
    pub fn merge(mut self, other: ContextBag) -> Self {
        if other.user_id != 0 {
            self.user_id = other.user_id;
        }
        if !other.phone.is_empty() {
            self.phone = other.phone;
        }
        if !other.sms_gate.is_empty() {
            self.sms_gate = other.sms_gate;
        }
        if !other.message.is_empty() {
            self.message = other.message;
        }
        if !other.request_id.is_empty() {
            self.request_id = other.request_id;
        }
        for attr in other.extra {
            if !is_unset(&attr.value) {
                upsert(&mut self.extra, attr);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_id == 0
            && self.phone.is_empty()
            && self.sms_gate.is_empty()
            && self.message.is_empty()
            && self.request_id.is_empty()
            && self.extra.is_empty()
    }

    /// One attribute per set field, in a fixed order: user id, phone, gate,
    /// message, request id, then extra fields in insertion order.
    pub fn attrs(&self) -> Vec<Attr> {
        let mut attrs = Vec::with_capacity(5 + self.extra.len());
        if let Some(id) = self.user_id() {
            attrs.push(Attr::int(USER_ID_KEY, id));
        }
        if let Some(phone) = self.phone() {
            attrs.push(Attr::string(PHONE_KEY, phone));
        }
        if let Some(gate) = self.sms_gate() {
            attrs.push(Attr::string(GATE_KEY, gate));
        }
        if let Some(message) = self.message() {
            attrs.push(Attr::string(MESSAGE_KEY, message));
        }
        if let Some(id) = self.request_id() {
            attrs.push(Attr::string(REQUEST_ID_KEY, id));
        }
        attrs.extend(self.extra.iter().cloned());
        attrs
    }
}

/// Empty strings, empty groups and numeric zeros are "unset".
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Int(0) | Value::Uint(0) => true,
        Value::Float(f) => *f == 0.0,
        Value::Duration(d) => d.is_zero(),
        other => other.is_empty(),
    }
}

fn integer_id(value: &Value) -> Option<i64> {
    match value {
        Value::Int(id) => Some(*id),
        Value::Uint(id) => i64::try_from(*id).ok(),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

fn upsert(fields: &mut Vec<Attr>, attr: Attr) {
    match fields.iter_mut().find(|a| a.key == attr.key) {
        Some(existing) => existing.value = attr.value,
        None => fields.push(attr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(bag: &ContextBag) -> Vec<String> {
        bag.attrs().into_iter().map(|a| a.key).collect()
    }

    #[test]
    fn test_empty_bag_has_no_attrs() {
        let bag = ContextBag::new();
        assert!(bag.is_empty());
        assert!(bag.attrs().is_empty());
    }

    #[test]
    fn test_merge_overwrites_only_set_fields() {
        let a = ContextBag::new()
            .with_user_id(1)
            .with_sms_gate("gate-a")
            .with_message("first");
        let b = ContextBag::new().with_message("second");

        let merged = a.merge(b);
        assert_eq!(merged.user_id(), Some(1));
        assert_eq!(merged.sms_gate(), Some("gate-a"));
        assert_eq!(merged.message(), Some("second"));
    }

    #[test]
    fn test_merge_ignores_empty_incoming() {
        let a = ContextBag::new().with_message("keep").with_user_id(9);
        let merged = a.clone().merge(ContextBag::new().with_message(""));
        assert_eq!(merged, a);
    }

    #[test]
    fn test_attr_order_is_fixed() {
        let bag = ContextBag::new()
            .with_request_id("req-1")
            .with_message("m")
            .with_field("tenant", "acme")
            .with_sms_gate("g")
            .with_phone("+79991234567")
            .with_user_id(42);

        assert_eq!(
            keys(&bag),
            ["user_id", "phone", "sms_gate", "message", "request_id", "tenant"]
        );
    }

    #[test]
    fn test_phone_masked_on_entry() {
        let bag = ContextBag::new().with_phone("+79991234567");
        assert_eq!(bag.phone(), Some("********4567"));
    }

    #[test]
    fn test_with_field_routes_builtin_keys() {
        let bag = ContextBag::new()
            .with_field("phone", "+15550001111")
            .with_field("user_id", 5i64)
            .with_field("message", "hi");
        assert_eq!(bag.phone(), Some("********1111"));
        assert_eq!(bag.user_id(), Some(5));
        assert_eq!(bag.message(), Some("hi"));
        assert!(bag.extra().is_empty());
    }

    #[test]
    fn test_with_field_builtin_keys_ignore_value_type() {
        let bag = ContextBag::new()
            .with_field("phone", 79991234567i64)
            .with_field("request_id", 17u64)
            .with_field("user_id", "not-a-number");

        assert_eq!(bag.phone(), Some("********4567"));
        assert_eq!(bag.request_id(), Some("17"));
        assert_eq!(bag.user_id(), None);
        assert!(bag.extra().is_empty());
        assert_eq!(keys(&bag), ["phone", "request_id"]);
    }

    #[test]
    fn test_with_field_accepts_unsigned_user_id() {
        let bag = ContextBag::new().with_field("user_id", 8u64);
        assert_eq!(bag.user_id(), Some(8));
        assert_eq!(ContextBag::new().with_field("user_id", u64::MAX).user_id(), None);
    }

    #[test]
    fn test_numeric_zero_is_unset() {
        let bag = ContextBag::new()
            .with_field("attempt", 0i64)
            .with_field("retries", 0u64)
            .with_field("user_id", 0i64);
        assert!(bag.is_empty());

        let earlier = ContextBag::new().with_field("attempt", 3i64);
        let merged = earlier.merge(ContextBag {
            extra: vec![Attr::int("attempt", 0)],
            ..Default::default()
        });
        let extra: Vec<_> = merged.extra().iter().map(|a| a.to_string()).collect();
        assert_eq!(extra, ["attempt=3"]);
    }

    #[test]
    fn test_extra_fields_upsert_in_place() {
        let bag = ContextBag::new()
            .with_field("a", "1")
            .with_field("b", "2")
            .with_field("a", "3")
            .with_field("c", "");

        let extra: Vec<_> = bag.extra().iter().map(|a| a.to_string()).collect();
        assert_eq!(extra, ["a=3", "b=2"]);
    }

    #[test]
    fn test_merge_extras() {
        let a = ContextBag::new().with_field("tenant", "a").with_field("zone", "eu");
        let b = ContextBag::new().with_field("tenant", "b").with_field("shard", 3i64);
        let merged = a.merge(b);

        let extra: Vec<_> = merged.extra().iter().map(|a| a.to_string()).collect();
        assert_eq!(extra, ["tenant=b", "zone=eu", "shard=3"]);
    }
}
