//! Team listings
//!
//! The users page shows everyone in the signed-in user's firm. Roles are
//! normalized on the way out; stored values are left untouched.

use crate::data::DataAccess;
use crate::models::auth::DataAccessError;
use crate::models::{Filter, Record};
use crate::roles::{self, CanonicalRole};
use crate::settings::DataSettings;
use serde::Serialize;
use serde_json::Value;

const FIRST_NAME_FIELD: &str = "firstName";
const LAST_NAME_FIELD: &str = "lastName";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMember {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: CanonicalRole,
}

impl TeamMember {
    /// Build a member from a user record; records without an id are skipped
    #[must_use]
    pub fn from_record(record: &Record, settings: &DataSettings) -> Option<Self> {
        let text = |field: &str| {
            record
                .get(field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        };

        let id = text("id")?;
        let display_name = match (text(FIRST_NAME_FIELD), text(LAST_NAME_FIELD)) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (first, last) => first.or(last),
        };

        Some(Self {
            id,
            email: text(&settings.email_field),
            display_name,
            role: record
                .get(&settings.role_field)
                .map_or(CanonicalRole::Unknown, roles::normalize_value),
        })
    }
}

#[derive(Clone)]
pub struct TeamDirectory {
    data: DataAccess,
    settings: DataSettings,
}

impl TeamDirectory {
    #[must_use]
    pub fn new(data: DataAccess, settings: DataSettings) -> Self {
        Self { data, settings }
    }

    /// Members of a firm with normalized roles
    ///
    /// # Errors
    ///
    /// Returns an error if the listing is rejected or fails under both modes
    pub async fn members(&self, firm_id: &str) -> Result<Vec<TeamMember>, DataAccessError> {
        let filter = Filter::eq(self.settings.firm_field.as_str(), firm_id);
        let records = self
            .data
            .list(&self.settings.user_model, &filter, self.settings.list_limit)
            .await?;

        let members: Vec<TeamMember> = records
            .iter()
            .filter_map(|r| TeamMember::from_record(r, &self.settings))
            .collect();
        log::debug!("Loaded {} members for firm {firm_id}", members.len());
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::record;
    use crate::testing::mock::MockDataClient;
    use serde_json::json;
    use std::sync::Arc;

    fn member(id: &str, firm_id: &str, role: &str) -> Record {
        record(json!({ "id": id, "firmId": firm_id, "role": role }))
    }

    #[test]
    fn test_member_from_record() {
        let settings = DataSettings::default();
        let member = TeamMember::from_record(
            &record(json!({
                "id": "u1",
                "email": "ops@acme-haulage.com",
                "firstName": "Grace",
                "lastName": "Hopper",
                "role": "Super Admin"
            })),
            &settings,
        )
        .unwrap();

        assert_eq!(member.display_name.as_deref(), Some("Grace Hopper"));
        assert_eq!(member.role, CanonicalRole::SuperManager);
        assert_eq!(member.email.as_deref(), Some("ops@acme-haulage.com"));
    }

    #[test]
    fn test_member_without_id_or_role() {
        let settings = DataSettings::default();
        let no_id = record(json!({ "email": "x@y.z" }));
        assert!(TeamMember::from_record(&no_id, &settings).is_none());

        let no_role = record(json!({ "id": "u2", "lastName": "Solo" }));
        let member = TeamMember::from_record(&no_role, &settings).unwrap();
        assert_eq!(member.role, CanonicalRole::Unknown);
        assert_eq!(member.display_name.as_deref(), Some("Solo"));
        assert_eq!(member.email, None);
    }

    #[tokio::test]
    async fn test_members_of_firm() {
        let client = Arc::new(MockDataClient::new());
        client.seed("User", member("u1", "f1", "ADMIN"));
        client.seed("User", member("u2", "f1", "Manager"));
        client.seed("User", member("u3", "f2", "MEMBER"));

        let directory = TeamDirectory::new(DataAccess::new(client), DataSettings::default());
        let members = directory.members("f1").await.unwrap();

        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.role == CanonicalRole::Admin));
    }
}
