use super::{optional_int, DEFAULT_DATE_FORMAT};
use crate::document::Document;
use crate::record::{Collection, Record};

/// An account, as returned by `users/me`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct User {
    document: Document,
}

pub type Users = Collection<User>;

impl User {
    pub fn id(&self) -> Option<i64> {
        optional_int(&self.document, "id")
    }

    /// Login name.
    pub fn userid(&self) -> String {
        self.document.get_string("userid", "")
    }

    pub fn email(&self) -> String {
        self.document.get_string("email", "")
    }

    pub fn firstname(&self) -> String {
        self.document.get_string("firstname", "")
    }

    pub fn lastname(&self) -> String {
        self.document.get_string("lastname", "")
    }

    /// First and last name joined by a space, trimmed when either is missing.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname(), self.lastname())
            .trim()
            .to_owned()
    }

    pub fn timezone(&self) -> String {
        self.document.get_string("timezone", "")
    }

    pub fn created_at(&self) -> String {
        self.document
            .get_formatted_date_time("created_at", "", DEFAULT_DATE_FORMAT)
    }
}

impl Record for User {
    const RESOURCE: &'static str = "User";
    const ENVELOPE_KEY: Option<&'static str> = Some("user");
    const COLLECTION_KEY: &'static str = "users";

    fn construct(_document: &Document) -> Self {
        Self::default()
    }

    fn from_document(document: Document) -> Self {
        Self { document }
    }

    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Payload;
    use serde_json::json;

    #[test]
    fn test_full_name() {
        let user = User::make_from_response(json!({
            "user": { "id": 5, "firstname": "Ada", "lastname": "Lovelace", "email": "ada@example.com" }
        }))
        .unwrap();
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert_eq!(user.timezone(), "");

        let partial = User::make(json!({ "lastname": "Hopper" })).unwrap();
        assert_eq!(partial.full_name(), "Hopper");
    }
}
