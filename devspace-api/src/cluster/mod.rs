use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Secret中CA证书的键
pub const SECRET_CA_KEY: &str = "ca.crt";
/// Secret中ServiceAccount令牌的键
pub const SECRET_TOKEN_KEY: &str = "token";

/// 访问集群过程中的错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClusterAccessError {
    #[error("invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),

    #[error("failed to connect to cluster: {0}")]
    Connect(String),

    #[error("credential is not cluster admin")]
    NotClusterAdmin,

    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: &'static str,
        namespace: String,
        name: String,
    },

    #[error("service account {namespace}/{name} has no bound secret")]
    NoBoundSecret { namespace: String, name: String },

    #[error("secret {secret} is missing key {key}")]
    MissingSecretData { secret: String, key: &'static str },

    #[error("kubernetes api error: {0}")]
    Api(String),

    #[error("failed to assemble kubeconfig: {0}")]
    Assemble(String),
}

impl ClusterAccessError {
    pub fn not_found(kind: &'static str, namespace: &str, name: &str) -> Self {
        ClusterAccessError::NotFound {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

/// ServiceAccount的只读视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccountInfo {
    pub name: String,
    pub namespace: String,
    /// 绑定的Secret名称，保持API Server返回的顺序
    pub secrets: Vec<String>,
}

impl ServiceAccountInfo {
    pub fn first_secret(&self) -> Option<&str> {
        self.secrets.first().map(String::as_str)
    }
}

/// ServiceAccount令牌Secret
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountSecret {
    pub name: String,
    pub namespace: String,
    pub data: BTreeMap<String, Vec<u8>>,
}

impl ServiceAccountSecret {
    pub fn ca_crt(&self) -> Result<&[u8], ClusterAccessError> {
        self.value(SECRET_CA_KEY)
    }

    pub fn token(&self) -> Result<&str, ClusterAccessError> {
        let raw = self.value(SECRET_TOKEN_KEY)?;
        std::str::from_utf8(raw)
            .map(str::trim)
            .map_err(|_| ClusterAccessError::MissingSecretData {
                secret: self.name.clone(),
                key: SECRET_TOKEN_KEY,
            })
    }

    fn value(&self, key: &'static str) -> Result<&[u8], ClusterAccessError> {
        self.data
            .get(key)
            .filter(|v| !v.is_empty())
            .map(Vec::as_slice)
            .ok_or_else(|| ClusterAccessError::MissingSecretData {
                secret: self.name.clone(),
                key,
            })
    }
}

impl std::fmt::Debug for ServiceAccountSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountSecret")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("keys", &self.data.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// 集群访问客户端
#[async_trait]
pub trait ClusterAccessClient: Send + Sync {
    /// 使用kubeconfig建立连接并确认该凭证拥有集群管理员权限
    ///
    /// 凭证不是集群管理员时返回`ClusterAccessError::NotClusterAdmin`，
    /// 因此也被用作权限探测
    async fn connect_admin(
        &self,
        kubeconfig: &[u8],
    ) -> Result<Arc<dyn ClusterHandle>, ClusterAccessError>;
}

/// 已建立的管理员连接
#[async_trait]
pub trait ClusterHandle: Send + Sync {
    async fn get_service_account(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<ServiceAccountInfo, ClusterAccessError>;

    async fn get_secret(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<ServiceAccountSecret, ClusterAccessError>;

    /// 列出指定ServiceAccount有权访问的命名空间
    async fn list_permitted_namespaces(
        &self,
        sa_name: &str,
        sa_namespace: &str,
    ) -> Result<Vec<String>, ClusterAccessError>;
}

/// 根据ServiceAccount令牌组装受限kubeconfig
pub trait CredentialAssembler: Send + Sync {
    /// 返回YAML格式的kubeconfig，空字符串视为失败
    fn assemble(
        &self,
        secret: &ServiceAccountSecret,
        server: &str,
        namespace: &str,
    ) -> Result<String, ClusterAccessError>;
}
