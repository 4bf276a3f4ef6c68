//! Decoded extension values exposed through [`CertificateData`](crate::CertificateData)

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use der::asn1::ObjectIdentifier;

/// `ExtensionValue` carries the decoded form of a certificate extension. Producers choose the shape;
/// consumers tolerate shapes they do not recognize by ignoring them.
///
/// The [`PDVCertificate`](crate::PDVCertificate) adapter produces the following shapes:
/// - certificate policies: a `List` of `Record`s with an `oid` field and optional `qualifier` and `uri` fields
/// - key usage: a `List` of `Text` values using RFC 5280 names, i.e., `digitalSignature`, `keyCertSign`
/// - extended key usage: a `List` of `Oid` values
/// - basic constraints: a `Record` with a `ca` field and optional `path_len` field
/// - all other extensions: `Bytes` containing the encoded extension value
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExtensionValue {
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Text value, possibly a dotted decimal OID
    Text(String),
    /// Object identifier value
    Oid(ObjectIdentifier),
    /// Opaque encoded value
    Bytes(Vec<u8>),
    /// Sequence of values
    List(Vec<ExtensionValue>),
    /// Named fields
    Record(BTreeMap<String, ExtensionValue>),
}

impl ExtensionValue {
    /// Returns the items if this is a `List`
    pub fn as_list(&self) -> Option<&[ExtensionValue]> {
        match self {
            ExtensionValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Returns the text if this is a `Text`
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExtensionValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the named field if this is a `Record`
    pub fn field(&self, name: &str) -> Option<&ExtensionValue> {
        match self {
            ExtensionValue::Record(fields) => fields.get(name),
            _ => None,
        }
    }

    /// `to_oid` returns an object identifier for `Oid` values and for `Text` values that parse as a
    /// dotted decimal OID. All other shapes yield None.
    pub fn to_oid(&self) -> Option<ObjectIdentifier> {
        match self {
            ExtensionValue::Oid(oid) => Some(*oid),
            ExtensionValue::Text(s) => ObjectIdentifier::new(s.as_str()).ok(),
            _ => None,
        }
    }
}

impl From<ObjectIdentifier> for ExtensionValue {
    fn from(oid: ObjectIdentifier) -> Self {
        ExtensionValue::Oid(oid)
    }
}

impl From<&str> for ExtensionValue {
    fn from(s: &str) -> Self {
        ExtensionValue::Text(s.into())
    }
}

impl From<bool> for ExtensionValue {
    fn from(b: bool) -> Self {
        ExtensionValue::Bool(b)
    }
}

#[test]
fn extension_value_accessors() {
    use alloc::string::ToString;
    use const_oid::db::rfc5280::ANY_POLICY;

    let text = ExtensionValue::from("2.5.29.32.0");
    assert_eq!(Some(ANY_POLICY), text.to_oid());
    assert_eq!(Some("2.5.29.32.0"), text.as_text());
    assert_eq!(None, ExtensionValue::from("not an oid").to_oid());
    assert_eq!(None, ExtensionValue::Integer(3).to_oid());

    let mut fields = BTreeMap::new();
    fields.insert("oid".to_string(), ExtensionValue::Oid(ANY_POLICY));
    let rec = ExtensionValue::Record(fields);
    assert_eq!(Some(ANY_POLICY), rec.field("oid").and_then(|v| v.to_oid()));
    assert!(rec.field("uri").is_none());
    assert!(rec.as_list().is_none());

    let list = ExtensionValue::List(alloc::vec![rec.clone(), text]);
    assert_eq!(2, list.as_list().map(|l| l.len()).unwrap_or_default());
}
