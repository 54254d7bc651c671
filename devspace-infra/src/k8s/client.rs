use async_trait::async_trait;
use devspace_api::{
    ClusterAccessClient, ClusterAccessError, ClusterHandle, ServiceAccountInfo,
    ServiceAccountSecret,
};
use futures_util::{stream, StreamExt, TryStreamExt};
use k8s_openapi::api::authorization::v1::{SelfSubjectAccessReview, SubjectAccessReview};
use k8s_openapi::api::core::v1::{Namespace, Secret, ServiceAccount};
use kube::api::{Api, ListParams, PostParams};
use kube::Client;
use std::sync::Arc;
use tracing::debug;

use super::review::{cluster_admin_review, is_allowed, namespace_review};
use super::{build_config, map_kube_error, KubeSettings};

/// 基于kube-rs的集群访问客户端
#[derive(Debug, Clone, Default)]
pub struct KubeClusterAccessClient {
    settings: KubeSettings,
}

impl KubeClusterAccessClient {
    pub fn new(settings: KubeSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &KubeSettings {
        &self.settings
    }

    /// 由kubeconfig构造客户端，不做权限校验
    pub async fn client(&self, kubeconfig: &[u8]) -> Result<Client, ClusterAccessError> {
        let config = build_config(kubeconfig, &self.settings).await?;
        Client::try_from(config).map_err(|e| ClusterAccessError::Connect(e.to_string()))
    }
}

#[async_trait]
impl ClusterAccessClient for KubeClusterAccessClient {
    async fn connect_admin(&self, kubeconfig: &[u8]) -> Result<Arc<dyn ClusterHandle>, ClusterAccessError> {
        let client = self.client(kubeconfig).await?;

        let reviews: Api<SelfSubjectAccessReview> = Api::all(client.clone());
        let review = reviews
            .create(&PostParams::default(), &cluster_admin_review())
            .await
            .map_err(map_kube_error)?;
        if !is_allowed(review.status.as_ref()) {
            return Err(ClusterAccessError::NotClusterAdmin);
        }

        Ok(Arc::new(KubeClusterHandle::new(client, self.settings.clone())))
    }
}

/// 已通过管理员校验的集群连接
#[derive(Clone)]
pub struct KubeClusterHandle {
    client: Client,
    settings: KubeSettings,
}

impl KubeClusterHandle {
    pub fn new(client: Client, settings: KubeSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl ClusterHandle for KubeClusterHandle {
    async fn get_service_account(&self, name: &str, namespace: &str) -> Result<ServiceAccountInfo, ClusterAccessError> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), namespace);
        match api.get(name).await {
            Ok(sa) => Ok(ServiceAccountInfo {
                name: name.to_string(),
                namespace: namespace.to_string(),
                secrets: sa
                    .secrets
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|reference| reference.name)
                    .collect(),
            }),
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                Err(ClusterAccessError::not_found("ServiceAccount", namespace, name))
            }
            Err(e) => Err(map_kube_error(e)),
        }
    }

    async fn get_secret(&self, name: &str, namespace: &str) -> Result<ServiceAccountSecret, ClusterAccessError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        match api.get(name).await {
            Ok(secret) => Ok(ServiceAccountSecret {
                name: name.to_string(),
                namespace: namespace.to_string(),
                data: secret
                    .data
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(key, value)| (key, value.0))
                    .collect(),
            }),
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                Err(ClusterAccessError::not_found("Secret", namespace, name))
            }
            Err(e) => Err(map_kube_error(e)),
        }
    }

    async fn list_permitted_namespaces(&self, sa_name: &str, sa_namespace: &str) -> Result<Vec<String>, ClusterAccessError> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let names: Vec<String> = namespaces
            .list(&ListParams::default())
            .await
            .map_err(map_kube_error)?
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect();

        let reviews: Api<SubjectAccessReview> = Api::all(self.client.clone());
        let attributes = &self.settings.review;
        let concurrency = self.settings.namespace_review_concurrency.max(1);
        let total = names.len();

        let mut permitted: Vec<String> = stream::iter(names)
            .map(|namespace| {
                let reviews = reviews.clone();
                async move {
                    let review = namespace_review(attributes, sa_name, sa_namespace, &namespace);
                    let result = reviews
                        .create(&PostParams::default(), &review)
                        .await
                        .map_err(map_kube_error)?;
                    Ok::<_, ClusterAccessError>(is_allowed(result.status.as_ref()).then_some(namespace))
                }
            })
            .buffer_unordered(concurrency)
            .try_collect::<Vec<Option<String>>>()
            .await?
            .into_iter()
            .flatten()
            .collect();
        permitted.sort();

        debug!(
            sa = %sa_name,
            total,
            permitted = permitted.len(),
            "Namespace access review finished"
        );
        Ok(permitted)
    }
}
