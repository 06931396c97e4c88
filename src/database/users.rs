use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;

use super::{MongoDB, UserRepository, USERS};
use crate::models::{ProfileUpdate, User};
use crate::utils::AppError;

const DUPLICATE_KEY: i32 = 11000;

pub(crate) fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

#[async_trait]
impl UserRepository for MongoDB {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .collection::<User>(USERS)
            .find_one(doc! { "email": email })
            .await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        Ok(self
            .collection::<User>(USERS)
            .find_one(doc! { "_id": id })
            .await?)
    }

    async fn insert(&self, mut user: User) -> Result<User, AppError> {
        user.id = Some(ObjectId::new());

        match self.collection::<User>(USERS).insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => {
                Err(AppError::Conflict("Account already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_profile(
        &self,
        id: &ObjectId,
        update: ProfileUpdate,
    ) -> Result<Option<User>, AppError> {
        let mut set = Document::new();
        if let Some(full_name) = update.full_name {
            set.insert("fullName", full_name);
        }
        if let Some(bio) = update.bio {
            set.insert("bio", bio);
        }
        if let Some(profile_pic) = update.profile_pic {
            set.insert("profilePic", profile_pic);
        }
        set.insert("updatedAt", Utc::now().timestamp_millis());

        Ok(self
            .collection::<User>(USERS)
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn list_except(&self, id: &ObjectId) -> Result<Vec<User>, AppError> {
        let cursor = self
            .collection::<User>(USERS)
            .find(doc! { "_id": { "$ne": id } })
            .sort(doc! { "fullName": 1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }
}
