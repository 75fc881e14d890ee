//! Principals, e.g. `AWS arn:aws:iam::123456789012:role/role-name`.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::traits::Arp;

use super::arp_type::ArpType;

const ACCOUNT_ID_LEN: usize = 12;

/// A principal of a given type (`AWS`, `Service`, `Federated`,
/// `CanonicalUser`) and value.
///
/// A bare twelve digit account id is normalized to the account's root ARN
/// on construction, so `AWS 123456789012` and
/// `AWS arn:aws:iam::123456789012:root` are the same principal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
pub struct Principal {
    #[serde(rename = "type")]
    principal_type: String,
    value: String,
}

#[derive(Deserialize)]
struct PrincipalRecord {
    #[serde(rename = "type")]
    principal_type: String,
    value: String,
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = PrincipalRecord::deserialize(deserializer)?;
        Ok(Principal::new(record.principal_type, record.value))
    }
}

fn is_account_id(value: &str) -> bool {
    value.len() == ACCOUNT_ID_LEN && value.bytes().all(|b| b.is_ascii_digit())
}

impl Principal {
    pub fn new<T: Into<String>, V: Into<String>>(principal_type: T, value: V) -> Self {
        let value = value.into();
        let value = if is_account_id(&value) {
            format!("arn:aws:iam::{value}:root")
        } else {
            value
        };
        Principal {
            principal_type: principal_type.into(),
            value,
        }
    }

    /// `AWS *`, every principal of the AWS type.
    pub fn any_aws() -> Self {
        Principal::new("AWS", "*")
    }

    pub fn principal_type(&self) -> &str {
        &self.principal_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The raw colon-separated segments of the value, e.g.
    /// `["arn", "aws", "iam", "", "123456789012", "role/role-name"]`.
    pub fn arn_elements(&self) -> Vec<&str> {
        self.value.splitn(6, ':').collect()
    }

    /// The account id embedded in an ARN value, if any.
    pub fn account_id(&self) -> Option<&str> {
        if !self.value.starts_with("arn:") {
            return None;
        }
        self.arn_elements()
            .get(4)
            .copied()
            .filter(|account| !account.is_empty())
    }

    /// True if this principal is an account root (`arn:...:iam::<id>:root`).
    pub fn is_account(&self) -> bool {
        let elements = self.arn_elements();
        elements.len() == 6
            && elements[0] == "arn"
            && elements[2] == "iam"
            && is_account_id(elements[4])
            && elements[5] == "root"
    }

    /// Principals never contain one another as values; coverage is only
    /// expressed through [`Arp::issubset`].
    pub fn contains(&self, _other: &Principal) -> bool {
        false
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}", self.principal_type, self.value)
    }
}

impl Arp for Principal {
    fn arp_type() -> ArpType {
        ArpType::Principal
    }

    fn issubset(&self, other: &Self) -> bool {
        if self.principal_type != other.principal_type {
            return false;
        }
        if self.value == other.value || other.value == "*" {
            return true;
        }
        other.is_account() && self.account_id().is_some() && self.account_id() == other.account_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[test]
    fn test_account_id_is_normalized() {
        let principal = Principal::new("AWS", "123456789012");
        assert_eq!(principal.value(), "arn:aws:iam::123456789012:root");
        assert_eq!(principal, Principal::new("AWS", "arn:aws:iam::123456789012:root"));
        assert!(principal.is_account());
        assert_eq!(principal.account_id(), Some("123456789012"));
    }

    #[test]
    fn test_arn_elements() {
        let principal = Principal::new("AWS", "arn:aws:iam::123456789012:role/role-name");
        assert_eq!(
            principal.arn_elements(),
            vec!["arn", "aws", "iam", "", "123456789012", "role/role-name"]
        );
        assert!(!principal.is_account());
    }

    #[test]
    fn test_service_principal_has_no_account() {
        let principal = Principal::new("Service", "ec2.amazonaws.com");
        assert_eq!(principal.account_id(), None);
        assert!(!principal.is_account());
    }

    #[parameterized(
        role_in_wildcard = { ("AWS", "arn:aws:iam::123456789012:role/role-name"), ("AWS", "*"), true },
        role_in_account = { ("AWS", "arn:aws:iam::123456789012:role/role-name"), ("AWS", "123456789012"), true },
        user_in_account_root = { ("AWS", "arn:aws:iam::123456789012:user/bob"), ("AWS", "arn:aws:iam::123456789012:root"), true },
        role_in_other_account = { ("AWS", "arn:aws:iam::123456789012:role/role-name"), ("AWS", "210987654321"), false },
        account_not_in_role = { ("AWS", "123456789012"), ("AWS", "arn:aws:iam::123456789012:role/role-name"), false },
        identical = { ("AWS", "arn:aws:iam::123456789012:role/role-name"), ("AWS", "arn:aws:iam::123456789012:role/role-name"), true },
        case_sensitive = { ("AWS", "arn:aws:iam::123456789012:role/Role-Name"), ("AWS", "arn:aws:iam::123456789012:role/role-name"), false },
        other_type_wildcard = { ("AWS", "arn:aws:iam::123456789012:role/role-name"), ("Federated", "*"), false },
        service_in_wildcard = { ("Service", "ec2.amazonaws.com"), ("Service", "*"), true },
    )]
    fn test_principal_issubset(value: (&str, &str), other: (&str, &str), expected: bool) {
        let value = Principal::new(value.0, value.1);
        let other = Principal::new(other.0, other.1);
        assert_eq!(value.issubset(&other), expected);
    }

    #[test]
    fn test_principal_contains_is_always_false() {
        let root = Principal::new("AWS", "123456789012");
        let role = Principal::new("AWS", "arn:aws:iam::123456789012:role/role-name");
        assert!(!root.contains(&role));
        assert!(!root.contains(&root));
    }

    #[test]
    fn test_principal_display_and_serde() {
        let principal = Principal::new("AWS", "123456789012");
        assert_eq!(principal.to_string(), "AWS arn:aws:iam::123456789012:root");
        let json = serde_json::to_value(&principal).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "AWS", "value": "arn:aws:iam::123456789012:root"})
        );
        let parsed: Principal =
            serde_json::from_value(serde_json::json!({"type": "AWS", "value": "123456789012"}))
                .unwrap();
        assert_eq!(parsed, principal);
    }
}
