use crate::schema::ra_user_auth;
use diesel::prelude::*;
use rcheevos_api::UserAuth;

/// The only row id the credential table accepts
pub const USER_AUTH_ROW_ID: i32 = 1;

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = ra_user_auth)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserAuthEntity {
    pub id: i32,
    pub username: String,
    pub token: String,
    pub updated_at: String,
}

impl From<&UserAuth> for UserAuthEntity {
    fn from(user_auth: &UserAuth) -> Self {
        UserAuthEntity {
            id: USER_AUTH_ROW_ID,
            username: user_auth.username.clone(),
            token: user_auth.token.clone(),
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl From<UserAuthEntity> for UserAuth {
    fn from(entity: UserAuthEntity) -> Self {
        UserAuth::new(entity.username, entity.token)
    }
}
