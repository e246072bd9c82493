use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, USERS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::{User, UserRole},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_by_ids(&self, ids: Vec<String>) -> AppResult<Vec<User>>;
    async fn find_by_reg_no(&self, reg_no: &str) -> AppResult<Option<User>>;
    async fn find_by_name_and_role(&self, name: &str, role: UserRole) -> AppResult<Option<User>>;
    async fn find_first_by_role(&self, role: UserRole) -> AppResult<Option<User>>;
    async fn list_by_role(&self, role: UserRole) -> AppResult<Vec<User>>;
    async fn count_with_password(&self, role: UserRole) -> AppResult<u64>;
    async fn update(&self, user: User) -> AppResult<User>;
    async fn delete_by_id_and_role(&self, id: &str, role: UserRole) -> AppResult<bool>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(USERS_COLLECTION);
        Self { collection }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        self.collection.insert_one(&user).await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "id": id }).await?;
        Ok(user)
    }

    async fn find_by_ids(&self, ids: Vec<String>) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.collection.find(doc! { "id": { "$in": ids } }).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn find_by_reg_no(&self, reg_no: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "regNo": reg_no }).await?;
        Ok(user)
    }

    async fn find_by_name_and_role(&self, name: &str, role: UserRole) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "name": name, "role": role.as_str() })
            .await?;
        Ok(user)
    }

    async fn find_first_by_role(&self, role: UserRole) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "role": role.as_str() })
            .sort(doc! { "createdAt": 1 })
            .await?;
        Ok(user)
    }

    async fn list_by_role(&self, role: UserRole) -> AppResult<Vec<User>> {
        let cursor = self
            .collection
            .find(doc! { "role": role.as_str() })
            .sort(doc! { "createdAt": 1 })
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn count_with_password(&self, role: UserRole) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! {
                "role": role.as_str(),
                "passwordHash": { "$exists": true, "$nin": [null, ""] }
            })
            .await?;
        Ok(count)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let result = self
            .collection
            .replace_one(doc! { "id": &user.id }, &user)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user.id
            )));
        }

        Ok(user)
    }

    async fn delete_by_id_and_role(&self, id: &str, role: UserRole) -> AppResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "id": id, "role": role.as_str() })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for users collection");

        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("id_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "regNo": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .sparse(true)
                        .name("reg_no_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "phone": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .sparse(true)
                        .name("phone_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "role": 1 })
                .options(IndexOptions::builder().name("role".to_string()).build())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;

        log::info!("Successfully created indexes for users collection");
        Ok(())
    }
}
