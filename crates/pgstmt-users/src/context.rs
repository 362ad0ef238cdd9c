//! Acting user passed explicitly to mutating repository calls.

use serde::{Deserialize, Serialize};

use crate::model::User;

/// The user performing an operation, recorded in audit columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl CurrentUser {
    /// Build from a fetched user. `None` when the user id was not selected.
    pub fn from_user(user: &User) -> Option<Self> {
        Some(Self {
            id: user.user_id?,
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_user_id() {
        let mut user = User {
            first_name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            ..User::default()
        };
        assert!(CurrentUser::from_user(&user).is_none());

        user.user_id = Some(3);
        let actor = CurrentUser::from_user(&user).unwrap();
        assert_eq!(actor.id, 3);
        assert_eq!(actor.first_name, "Ada");
        assert_eq!(actor.last_name, "");
    }
}
