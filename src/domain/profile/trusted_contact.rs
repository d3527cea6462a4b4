use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// How a trusted contact prefers to be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactMethod {
    Sms,
    Email,
}

/// Person the user has nominated to be told when they may be at risk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedContact {
    pub name: String,
    pub preferred_method: ContactMethod,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl TrustedContact {
    /// Creates a contact, requiring at least one way to reach them.
    pub fn new(
        name: impl Into<String>,
        preferred_method: ContactMethod,
        phone: Option<String>,
        email: Option<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        let phone = phone.filter(|p| !p.trim().is_empty());
        let email = email.filter(|e| !e.trim().is_empty());
        if phone.is_none() && email.is_none() {
            return Err(ValidationError::empty_field("phone_or_email"));
        }
        Ok(Self {
            name,
            preferred_method,
            phone,
            email,
        })
    }

    /// The preferred method when its address is known, otherwise whichever
    /// address is present.
    pub fn reachable_method(&self) -> Option<ContactMethod> {
        match (self.preferred_method, &self.phone, &self.email) {
            (ContactMethod::Sms, Some(_), _) => Some(ContactMethod::Sms),
            (ContactMethod::Email, _, Some(_)) => Some(ContactMethod::Email),
            (_, Some(_), None) => Some(ContactMethod::Sms),
            (_, None, Some(_)) => Some(ContactMethod::Email),
            _ => None,
        }
    }

    /// Address for the given method, if known.
    pub fn address(&self, method: ContactMethod) -> Option<&str> {
        match method {
            ContactMethod::Sms => self.phone.as_deref(),
            ContactMethod::Email => self.email.as_deref(),
        }
    }
}
