//! User repository.

use chrono::{DateTime, Utc};
use pgstmt::{
    Aggregate, AppEnv, Column, Condition, DbConnector, DeleteParams, DeleteQuery, InsertParams,
    InsertQuery, Join, JoinOn, Model, Order, OrmError, OrmResult, SelectParams, SelectQuery,
    UpdateParams, UpdateQuery, Value,
};

use crate::context::CurrentUser;
use crate::grid::GridConfig;
use crate::model::{Audit, User};

/// Join alias of the creator self-join.
pub const CREATOR_ALIAS: &str = "t_sys_users1";
/// Join alias of the updater self-join.
pub const UPDATER_ALIAS: &str = "t_sys_users2";

/// Non-deleted users, optionally narrowed by an email search.
fn listing_conditions(grid: Option<&GridConfig>) -> Vec<Condition> {
    let mut conditions = Vec::with_capacity(2);
    if let Some(text) = grid.and_then(GridConfig::search) {
        conditions.push(
            Condition::ilike(User::EMAIL, format!("%{text}%")).on_table(User::TABLE_NAME),
        );
    }
    conditions.push(Condition::is_null(Audit::DELETED_DATE).on_table(User::TABLE_NAME));
    conditions
}

/// INSERT of a new user. `created_by` is only set when an actor is known.
pub fn create_query(
    user: &User,
    actor: Option<&CurrentUser>,
    now: DateTime<Utc>,
) -> OrmResult<InsertQuery> {
    let mut params = InsertParams::new(User::TABLE_NAME)
        .set(User::FIRST_NAME, user.first_name.clone())
        .set(User::LAST_NAME, user.last_name.clone())
        .set(User::EMAIL, user.email.clone())
        .set(User::PASSWORD, user.password.clone())
        .set(User::IS_ROOT, user.is_root.unwrap_or(false))
        .set(Audit::CREATED_DATE, now);
    if let Some(actor) = actor {
        params = params.set(Audit::CREATED_BY, actor.id);
    }
    params.build()
}

/// Partial UPDATE of names and email; absent fields keep their value.
pub fn update_query(user: &User, actor: &CurrentUser, now: DateTime<Utc>) -> OrmResult<UpdateQuery> {
    let user_id = user
        .user_id
        .ok_or_else(|| OrmError::validation("a user id is required to update a user"))?;

    UpdateParams::new(User::TABLE_NAME)
        .set_if_present(User::FIRST_NAME, user.first_name.clone())
        .set_if_present(User::LAST_NAME, user.last_name.clone())
        .set_if_present(User::EMAIL, user.email.clone())
        .set(Audit::UPDATED_BY, actor.id)
        .set(Audit::UPDATED_DATE, now)
        .condition(Condition::eq(User::USER_ID, user_id))
        .build()
}

/// Soft delete of a non-root user.
pub fn delete_query(user_id: i64, actor: &CurrentUser, now: DateTime<Utc>) -> OrmResult<UpdateQuery> {
    UpdateParams::new(User::TABLE_NAME)
        .set(Audit::DELETED_BY, actor.id)
        .set(Audit::DELETED_DATE, now)
        .condition(Condition::eq(User::USER_ID, user_id))
        .condition(Condition::eq(User::IS_ROOT, false))
        .build()
}

/// Unfiltered DELETE of every user row.
pub fn delete_all_query() -> OrmResult<DeleteQuery> {
    DeleteParams::new(User::TABLE_NAME).build()
}

/// Lookup of a non-deleted user by email.
pub fn get_by_email_query(
    email: &str,
    include_auth: bool,
    include_user_id: bool,
) -> OrmResult<SelectQuery> {
    let mut params = SelectParams::new(User::TABLE_NAME)
        .column(Column::new(User::FIRST_NAME))
        .column(Column::new(User::LAST_NAME))
        .column(Column::new(User::EMAIL))
        .column(Column::new(User::IS_ROOT))
        .conditions(vec![
            Condition::eq(User::EMAIL, email),
            Condition::is_null(Audit::DELETED_DATE),
        ]);
    if include_auth {
        params = params.column(Column::new(User::PASSWORD));
    }
    if include_user_id {
        params = params.column(Column::new(User::USER_ID));
    }
    params.build()
}

pub fn get_by_id_query(user_id: i64) -> OrmResult<SelectQuery> {
    SelectParams::new(User::TABLE_NAME)
        .column(Column::new(User::FIRST_NAME))
        .column(Column::new(User::LAST_NAME))
        .column(Column::new(User::EMAIL))
        .conditions(vec![Condition::eq(User::USER_ID, user_id)])
        .build()
}

/// `COUNT(DISTINCT(c_userid))` aliased `count`.
pub fn count_all_query(grid: Option<&GridConfig>) -> OrmResult<SelectQuery> {
    SelectParams::new(User::TABLE_NAME)
        .column(
            Column::new(User::USER_ID)
                .aggregate(Aggregate::Count)
                .aggregate(Aggregate::Distinct)
                .alias("count"),
        )
        .conditions(listing_conditions(grid))
        .build()
}

/// Grid listing with creator and updater names from two self-joins.
pub fn get_all_query(grid: Option<&GridConfig>) -> OrmResult<SelectQuery> {
    let t = User::TABLE_NAME;
    let mut params = SelectParams::new(t)
        .column(Column::new(User::USER_ID).alias("userId"))
        .column(Column::new(User::FIRST_NAME).alias("firstName"))
        .column(Column::new(User::LAST_NAME).alias("lastName"))
        .column(Column::new(User::EMAIL).alias("email"))
        .column(
            Column::new(User::FIRST_NAME)
                .from_table(CREATOR_ALIAS)
                .alias("createdByUsername"),
        )
        .column(Column::new(Audit::CREATED_DATE).alias("createdDate"))
        .column(
            Column::new(User::FIRST_NAME)
                .from_table(UPDATER_ALIAS)
                .alias("updatedByUsername"),
        )
        .column(Column::new(Audit::UPDATED_DATE).alias("updatedDate"))
        .join(Join::left(t).alias(CREATOR_ALIAS).on(JoinOn::eq(
            t,
            Audit::CREATED_BY,
            CREATOR_ALIAS,
            User::USER_ID,
        )))
        .join(Join::left(t).alias(UPDATER_ALIAS).on(JoinOn::eq(
            t,
            Audit::UPDATED_BY,
            UPDATER_ALIAS,
            User::USER_ID,
        )))
        .conditions(listing_conditions(grid));

    let Some(grid) = grid else {
        return params.build();
    };
    if let Some(limit) = grid.limit()? {
        params = params.limit(limit);
    }
    if let Some(offset) = grid.offset()? {
        params = params.offset(offset);
    }

    // Only output aliases of this listing can be sorted on.
    let unordered = params.clone().build()?;
    let aliases: Vec<&str> = unordered.output_aliases().collect();
    let orders: Vec<Order> = grid
        .selected_orders(&aliases)
        .map(|order| Order {
            column: order.column_name.clone(),
            direction: order.direction,
        })
        .collect();
    for order in orders {
        params = params.order_by(order);
    }
    params.build()
}

/// Repository of `t_sys_users`.
#[derive(Debug, Clone)]
pub struct UserRepo {
    db: DbConnector,
    env: AppEnv,
}

impl UserRepo {
    /// Repository on `db`, with the environment read from `APP_ENV` / `NODE_ENV`.
    pub fn new(db: DbConnector) -> Self {
        Self {
            db,
            env: AppEnv::from_env(),
        }
    }

    pub fn with_env(mut self, env: AppEnv) -> Self {
        self.env = env;
        self
    }

    pub fn env(&self) -> AppEnv {
        self.env
    }

    pub async fn create(&self, user: &User, actor: Option<&CurrentUser>) -> OrmResult<User> {
        let insert = create_query(user, actor, Utc::now())?;
        let created = self
            .db
            .run_as::<User>(&insert)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| OrmError::Other("Failed to create user.".to_string()))?;
        tracing::info!(user_id = ?created.user_id, created_by = ?actor.map(|a| a.id), "user created");
        Ok(created)
    }

    /// Returns the updated user, `None` when no row matched.
    pub async fn update(&self, user: &User, actor: &CurrentUser) -> OrmResult<Option<User>> {
        let update = update_query(user, actor, Utc::now())?;
        let updated = self.db.run_as::<User>(&update).await?.into_iter().next();
        tracing::info!(user_id = ?user.user_id, updated_by = actor.id, found = updated.is_some(), "user updated");
        Ok(updated)
    }

    /// Soft delete. Root users are never matched.
    pub async fn delete(&self, user_id: i64, actor: &CurrentUser) -> OrmResult<Option<User>> {
        let update = delete_query(user_id, actor, Utc::now())?;
        let deleted = self.db.run_as::<User>(&update).await?.into_iter().next();
        tracing::info!(user_id, deleted_by = actor.id, found = deleted.is_some(), "user deleted");
        Ok(deleted)
    }

    /// Remove every user row, only in the test environment.
    ///
    /// Returns the number of deleted rows; elsewhere it does nothing and returns 0.
    pub async fn delete_all_test_users(&self) -> OrmResult<usize> {
        if !self.env.is_test() {
            tracing::warn!(env = ?self.env, "refusing to delete all users outside the test environment");
            return Ok(0);
        }
        let delete = delete_all_query()?;
        let deleted = self.db.run(&delete).await?.len();
        tracing::info!(deleted, "test users deleted");
        Ok(deleted)
    }

    pub async fn get_by_email(
        &self,
        email: &str,
        include_auth: bool,
        include_user_id: bool,
    ) -> OrmResult<Option<User>> {
        let select = get_by_email_query(email, include_auth, include_user_id)?;
        Ok(self.db.run_as::<User>(&select).await?.into_iter().next())
    }

    pub async fn get_by_id(&self, user_id: i64) -> OrmResult<User> {
        let select = get_by_id_query(user_id)?;
        self.db
            .run_as::<User>(&select)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| OrmError::not_found("User not found."))
    }

    /// Acting-user context for the user with `email`.
    pub async fn current_user_by_email(&self, email: &str) -> OrmResult<CurrentUser> {
        self.get_by_email(email, false, true)
            .await?
            .as_ref()
            .and_then(CurrentUser::from_user)
            .ok_or_else(|| OrmError::not_found("User not found."))
    }

    pub async fn count_all(&self, grid: Option<&GridConfig>) -> OrmResult<u64> {
        let select = count_all_query(grid)?;
        let records = self.db.run(&select).await?;
        match records.first().and_then(|r| r.get("count")) {
            Some(Value::Int(n)) => u64::try_from(*n)
                .map_err(|_| OrmError::decode("count", format!("negative count {n}"))),
            Some(other) => Err(OrmError::decode("count", format!("unexpected value {other:?}"))),
            None => Ok(0),
        }
    }

    pub async fn get_all(&self, grid: Option<&GridConfig>) -> OrmResult<Vec<User>> {
        let select = get_all_query(grid)?;
        self.db.run_as::<User>(&select).await
    }
}
