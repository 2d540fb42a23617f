use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::error::{NotificationError, NotificationResult};
use crate::models::{Email, NewEmail};

/// Sea-ORM Entity for the emails table
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "emails")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub sent_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// `BIGINT` columns hold the unsigned ids used everywhere else.
pub(crate) fn to_db_id(id: u64) -> NotificationResult<i64> {
    i64::try_from(id)
        .map_err(|_| NotificationError::Persistence(format!("id {} does not fit BIGINT", id)))
}

impl From<Model> for Email {
    fn from(model: Model) -> Self {
        Self {
            id: model.id as u64,
            user_id: model.user_id as u64,
            email: model.email,
            content: model.content,
            sent_at: model.sent_at.into(),
        }
    }
}

impl TryFrom<NewEmail> for ActiveModel {
    type Error = NotificationError;

    fn try_from(input: NewEmail) -> NotificationResult<Self> {
        Ok(ActiveModel {
            id: NotSet,
            user_id: Set(to_db_id(input.user_id)?),
            email: Set(input.email),
            content: Set(input.content),
            sent_at: Set(input.sent_at.into()),
        })
    }
}
