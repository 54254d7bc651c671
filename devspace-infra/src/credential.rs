use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use devspace_api::{ClusterAccessError, CredentialAssembler, ServiceAccountSecret};
use serde::Serialize;

/// 生成的kubeconfig中集群、用户、上下文的默认名称
pub const DEFAULT_ENTRY_NAME: &str = "devspace";

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct Kubeconfig {
    api_version: &'static str,
    kind: &'static str,
    clusters: Vec<NamedCluster>,
    users: Vec<NamedUser>,
    contexts: Vec<NamedContext>,
    current_context: String,
}

#[derive(Debug, Serialize)]
struct NamedCluster {
    name: String,
    cluster: ClusterEntry,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct ClusterEntry {
    server: String,
    certificate_authority_data: String,
}

#[derive(Debug, Serialize)]
struct NamedUser {
    name: String,
    user: UserEntry,
}

#[derive(Debug, Serialize)]
struct UserEntry {
    token: String,
}

#[derive(Debug, Serialize)]
struct NamedContext {
    name: String,
    context: ContextEntry,
}

#[derive(Debug, Serialize)]
struct ContextEntry {
    cluster: String,
    user: String,
    namespace: String,
}

/// 用ServiceAccount令牌Secret组装单上下文kubeconfig
#[derive(Debug, Clone)]
pub struct DevKubeconfigAssembler {
    entry_name: String,
}

impl DevKubeconfigAssembler {
    pub fn new(entry_name: impl Into<String>) -> Self {
        Self {
            entry_name: entry_name.into(),
        }
    }
}

impl Default for DevKubeconfigAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRY_NAME)
    }
}

impl CredentialAssembler for DevKubeconfigAssembler {
    fn assemble(
        &self,
        secret: &ServiceAccountSecret,
        server: &str,
        namespace: &str,
    ) -> Result<String, ClusterAccessError> {
        if server.trim().is_empty() {
            return Err(ClusterAccessError::Assemble("cluster server address is empty".to_string()));
        }
        let ca = secret.ca_crt()?;
        let token = secret.token()?;
        if token.is_empty() {
            return Err(ClusterAccessError::MissingSecretData {
                secret: secret.name.clone(),
                key: devspace_api::cluster::SECRET_TOKEN_KEY,
            });
        }

        let name = self.entry_name.clone();
        let kubeconfig = Kubeconfig {
            api_version: "v1",
            kind: "Config",
            clusters: vec![NamedCluster {
                name: name.clone(),
                cluster: ClusterEntry {
                    server: server.trim().to_string(),
                    certificate_authority_data: STANDARD.encode(ca),
                },
            }],
            users: vec![NamedUser {
                name: name.clone(),
                user: UserEntry {
                    token: token.to_string(),
                },
            }],
            contexts: vec![NamedContext {
                name: name.clone(),
                context: ContextEntry {
                    cluster: name.clone(),
                    user: name.clone(),
                    namespace: namespace.to_string(),
                },
            }],
            current_context: name,
        };

        serde_yaml::to_string(&kubeconfig).map_err(|e| ClusterAccessError::Assemble(e.to_string()))
    }
}
