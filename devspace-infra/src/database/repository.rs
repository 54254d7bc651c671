use async_trait::async_trait;
use devspace_api::{ClusterRegistry, SpaceAssignmentStore, UserStore};
use devspace_domain::{Cluster, SpaceAssignment, SpaceAssignmentFilter, User};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;

use super::entity::{cluster, dev_space, user};

type StoreResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

impl From<cluster::Model> for Cluster {
    fn from(model: cluster::Model) -> Self {
        Cluster {
            id: model.id as u64,
            name: model.name,
            kubeconfig: model.kubeconfig,
            server: model.server,
            storage_class: model.storage_class,
        }
    }
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        let id = model.id as u64;
        let sa_name = model
            .sa_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| User::default_sa_name(id));
        User::new(id, model.name, model.email, sa_name)
    }
}

impl From<dev_space::Model> for SpaceAssignment {
    fn from(model: dev_space::Model) -> Self {
        SpaceAssignment {
            id: model.id as u64,
            cluster_id: model.cluster_id as u64,
            user_id: model.user_id as u64,
            namespace: model.namespace,
            space_name: model.space_name,
        }
    }
}

/// SeaOrmClusterRegistry 使用Sea-ORM实现的集群注册表
pub struct SeaOrmClusterRegistry {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmClusterRegistry {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClusterRegistry for SeaOrmClusterRegistry {
    async fn list(&self) -> StoreResult<Vec<Cluster>> {
        let models = cluster::Entity::find()
            .filter(cluster::Column::DeletedAt.is_null())
            .order_by_asc(cluster::Column::Id)
            .all(&*self.db)
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

        Ok(models.into_iter().map(Cluster::from).collect())
    }

    async fn get(&self, id: u64) -> StoreResult<Option<Cluster>> {
        let model = cluster::Entity::find_by_id(id as i64)
            .filter(cluster::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

        Ok(model.map(Cluster::from))
    }
}

/// SeaOrmUserStore 使用Sea-ORM实现的用户存储
pub struct SeaOrmUserStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmUserStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for SeaOrmUserStore {
    async fn get_by_id(&self, id: u64) -> StoreResult<Option<User>> {
        let model = user::Entity::find_by_id(id as i64)
            .filter(user::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

        Ok(model.map(User::from))
    }
}

/// SeaOrmSpaceAssignmentStore 使用Sea-ORM实现的开发空间存储
pub struct SeaOrmSpaceAssignmentStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSpaceAssignmentStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SpaceAssignmentStore for SeaOrmSpaceAssignmentStore {
    async fn list(&self, filter: SpaceAssignmentFilter) -> StoreResult<Vec<SpaceAssignment>> {
        let mut query = dev_space::Entity::find().filter(dev_space::Column::DeletedAt.is_null());

        if let Some(cluster_id) = filter.cluster_id {
            query = query.filter(dev_space::Column::ClusterId.eq(cluster_id as i64));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(dev_space::Column::UserId.eq(user_id as i64));
        }

        let models = query
            .order_by_asc(dev_space::Column::Id)
            .all(&*self.db)
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

        Ok(models.into_iter().map(SpaceAssignment::from).collect())
    }
}
