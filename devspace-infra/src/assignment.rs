use async_trait::async_trait;
use devspace_api::{AssignmentError, AssignmentService, ClusterAccessError, ClusterRegistry, UserStore};
use k8s_openapi::api::core::v1::{Namespace, ObjectReference, Secret, ServiceAccount};
use k8s_openapi::api::rbac::v1::{RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::k8s::{map_kube_error, KubeClusterAccessClient};

/// 服务端应用使用的字段管理器
pub const FIELD_MANAGER: &str = "devspace";
/// 默认绑定的ClusterRole
pub const DEFAULT_DEV_CLUSTER_ROLE: &str = "edit";

const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
const SA_NAME_ANNOTATION: &str = "kubernetes.io/service-account.name";
const SA_UID_ANNOTATION: &str = "kubernetes.io/service-account.uid";
const SA_TOKEN_SECRET_TYPE: &str = "kubernetes.io/service-account-token";

/// 授权写入配置
#[derive(Debug, Clone)]
pub struct AssignmentSettings {
    pub service_account_namespace: String,
    pub cluster_role: String,
}

impl Default for AssignmentSettings {
    fn default() -> Self {
        Self {
            service_account_namespace: "devspace-reserved".to_string(),
            cluster_role: DEFAULT_DEV_CLUSTER_ROLE.to_string(),
        }
    }
}

fn managed_labels() -> BTreeMap<String, String> {
    [(MANAGED_BY_LABEL.to_string(), FIELD_MANAGER.to_string())].into()
}

pub fn token_secret_name(sa_name: &str) -> String {
    format!("{}-token", sa_name)
}

pub fn role_binding_name(sa_name: &str) -> String {
    format!("devspace:{}", sa_name)
}

/// ServiceAccount，secrets中引用令牌Secret
pub fn build_service_account(sa_name: &str, sa_namespace: &str) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMeta {
            name: Some(sa_name.to_string()),
            namespace: Some(sa_namespace.to_string()),
            labels: Some(managed_labels()),
            ..Default::default()
        },
        secrets: Some(vec![ObjectReference {
            name: Some(token_secret_name(sa_name)),
            namespace: Some(sa_namespace.to_string()),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

/// 令牌Secret，由集群的令牌控制器填充ca.crt和token
pub fn build_token_secret(sa_name: &str, sa_namespace: &str, sa_uid: Option<&str>) -> Secret {
    let mut annotations = BTreeMap::from([(SA_NAME_ANNOTATION.to_string(), sa_name.to_string())]);
    if let Some(uid) = sa_uid {
        annotations.insert(SA_UID_ANNOTATION.to_string(), uid.to_string());
    }
    Secret {
        metadata: ObjectMeta {
            name: Some(token_secret_name(sa_name)),
            namespace: Some(sa_namespace.to_string()),
            labels: Some(managed_labels()),
            annotations: Some(annotations),
            ..Default::default()
        },
        type_: Some(SA_TOKEN_SECRET_TYPE.to_string()),
        ..Default::default()
    }
}

pub fn build_reserved_namespace(name: &str) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(managed_labels()),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn build_role_binding(namespace: &str, sa_name: &str, sa_namespace: &str, cluster_role: &str) -> RoleBinding {
    RoleBinding {
        metadata: ObjectMeta {
            name: Some(role_binding_name(sa_name)),
            namespace: Some(namespace.to_string()),
            labels: Some(managed_labels()),
            ..Default::default()
        },
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "ClusterRole".to_string(),
            name: cluster_role.to_string(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".to_string(),
            name: sa_name.to_string(),
            namespace: Some(sa_namespace.to_string()),
            ..Default::default()
        }]),
    }
}

/// 授权写入步骤对集群的操作
#[async_trait]
pub(crate) trait AssignmentWriter: Send + Sync {
    async fn namespace_exists(&self, name: &str) -> Result<bool, ClusterAccessError>;
    async fn create_namespace(&self, namespace: &Namespace) -> Result<(), ClusterAccessError>;
    /// 返回服务端分配的uid
    async fn apply_service_account(&self, account: &ServiceAccount) -> Result<Option<String>, ClusterAccessError>;
    async fn create_secret(&self, secret: &Secret) -> Result<(), ClusterAccessError>;
    async fn apply_role_binding(&self, binding: &RoleBinding) -> Result<(), ClusterAccessError>;
}

/// 按顺序执行授权写入
///
/// ServiceAccount必须先于令牌Secret存在，否则令牌控制器会删除该Secret。
pub(crate) async fn write_assignment(
    writer: &dyn AssignmentWriter,
    settings: &AssignmentSettings,
    namespace: &str,
    sa_name: &str,
) -> Result<(), AssignmentError> {
    if !writer.namespace_exists(namespace).await? {
        return Err(AssignmentError::NamespaceNotFound(namespace.to_string()));
    }

    let sa_namespace = &settings.service_account_namespace;
    writer.create_namespace(&build_reserved_namespace(sa_namespace)).await?;

    let uid = writer
        .apply_service_account(&build_service_account(sa_name, sa_namespace))
        .await?;
    writer
        .create_secret(&build_token_secret(sa_name, sa_namespace, uid.as_deref()))
        .await?;

    writer
        .apply_role_binding(&build_role_binding(namespace, sa_name, sa_namespace, &settings.cluster_role))
        .await?;
    Ok(())
}

struct KubeAssignmentWriter {
    client: Client,
}

#[async_trait]
impl AssignmentWriter for KubeAssignmentWriter {
    async fn namespace_exists(&self, name: &str) -> Result<bool, ClusterAccessError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        Ok(api.get_opt(name).await.map_err(map_kube_error)?.is_some())
    }

    async fn create_namespace(&self, namespace: &Namespace) -> Result<(), ClusterAccessError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        create_if_absent(&api, namespace).await
    }

    async fn apply_service_account(&self, account: &ServiceAccount) -> Result<Option<String>, ClusterAccessError> {
        let namespace = account.metadata.namespace.as_deref().unwrap_or_default();
        let name = account.metadata.name.as_deref().unwrap_or_default();
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), namespace);
        let applied = api
            .patch(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Apply(account))
            .await
            .map_err(map_kube_error)?;
        Ok(applied.metadata.uid)
    }

    async fn create_secret(&self, secret: &Secret) -> Result<(), ClusterAccessError> {
        let namespace = secret.metadata.namespace.as_deref().unwrap_or_default();
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        create_if_absent(&api, secret).await
    }

    async fn apply_role_binding(&self, binding: &RoleBinding) -> Result<(), ClusterAccessError> {
        let namespace = binding.metadata.namespace.as_deref().unwrap_or_default();
        let name = binding.metadata.name.as_deref().unwrap_or_default();
        let api: Api<RoleBinding> = Api::namespaced(self.client.clone(), namespace);
        api.patch(name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Apply(binding))
            .await
            .map_err(map_kube_error)?;
        Ok(())
    }
}

async fn create_if_absent<K>(api: &Api<K>, object: &K) -> Result<(), ClusterAccessError>
where
    K: kube::Resource + Clone + std::fmt::Debug + serde::Serialize + serde::de::DeserializeOwned,
{
    match api.create(&PostParams::default(), object).await {
        Ok(_) => Ok(()),
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            debug!(name = ?object.meta().name, "Object already exists");
            Ok(())
        }
        Err(e) => Err(map_kube_error(e)),
    }
}

/// 通过RoleBinding把命名空间授权给用户ServiceAccount
///
/// 所有写操作都是幂等的：已存在的对象返回409时视为成功，
/// ServiceAccount和RoleBinding使用服务端应用。
///
/// 不校验调用者是否有权授予，对外暴露时需要由上层做管理员鉴权。
pub struct KubeAssignmentService {
    clusters: Arc<dyn ClusterRegistry>,
    users: Arc<dyn UserStore>,
    access: Arc<KubeClusterAccessClient>,
    settings: AssignmentSettings,
}

impl KubeAssignmentService {
    pub fn new(
        clusters: Arc<dyn ClusterRegistry>,
        users: Arc<dyn UserStore>,
        access: Arc<KubeClusterAccessClient>,
        settings: AssignmentSettings,
    ) -> Self {
        Self {
            clusters,
            users,
            access,
            settings,
        }
    }
}

#[async_trait]
impl AssignmentService for KubeAssignmentService {
    async fn authorize_namespace(
        &self,
        cluster_id: u64,
        user_id: u64,
        space_name: &str,
    ) -> Result<(), AssignmentError> {
        let cluster = self
            .clusters
            .get(cluster_id)
            .await
            .map_err(|e| AssignmentError::Store(e.to_string()))?
            .ok_or(AssignmentError::ClusterNotFound(cluster_id))?;
        let user = self
            .users
            .get_by_id(user_id)
            .await
            .map_err(|e| AssignmentError::Store(e.to_string()))?
            .ok_or(AssignmentError::UserNotFound(user_id))?;

        let client = self.access.client(cluster.kubeconfig_bytes()).await?;
        let writer = KubeAssignmentWriter { client };

        // 开发空间名即目标命名空间
        write_assignment(&writer, &self.settings, space_name, &user.sa_name).await?;

        info!(
            cluster_id,
            user_id,
            namespace = %space_name,
            sa = %user.sa_name,
            "Namespace authorized to user"
        );
        Ok(())
    }
}
