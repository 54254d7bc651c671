pub mod client;
pub mod review;

pub use client::{KubeClusterAccessClient, KubeClusterHandle};
pub use review::ReviewAttributes;

use devspace_api::ClusterAccessError;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Config;
use std::time::Duration;

/// Kubernetes客户端配置
#[derive(Debug, Clone)]
pub struct KubeSettings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// 单集群内并发的命名空间访问审查数
    pub namespace_review_concurrency: usize,
    /// 判定命名空间可访问所用的资源属性
    pub review: ReviewAttributes,
}

impl Default for KubeSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            namespace_review_concurrency: 16,
            review: ReviewAttributes::default(),
        }
    }
}

/// 解析kubeconfig原文
pub fn parse_kubeconfig(raw: &[u8]) -> Result<Kubeconfig, ClusterAccessError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| ClusterAccessError::InvalidKubeconfig(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(ClusterAccessError::InvalidKubeconfig("empty kubeconfig".to_string()));
    }

    let kubeconfig: Kubeconfig = serde_yaml::from_str(text)
        .map_err(|e| ClusterAccessError::InvalidKubeconfig(e.to_string()))?;
    if kubeconfig.clusters.is_empty() {
        return Err(ClusterAccessError::InvalidKubeconfig("no cluster entry".to_string()));
    }
    Ok(kubeconfig)
}

/// 由kubeconfig原文构造客户端配置并设置超时
pub async fn build_config(raw: &[u8], settings: &KubeSettings) -> Result<Config, ClusterAccessError> {
    let kubeconfig = parse_kubeconfig(raw)?;
    let mut config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| ClusterAccessError::InvalidKubeconfig(e.to_string()))?;
    config.connect_timeout = Some(settings.connect_timeout);
    config.read_timeout = Some(settings.read_timeout);
    Ok(config)
}

/// 将kube错误归类，404视为资源不存在由调用方处理
pub(crate) fn map_kube_error(error: kube::Error) -> ClusterAccessError {
    match error {
        kube::Error::Api(ae) => ClusterAccessError::Api(format!("{} ({})", ae.message, ae.code)),
        other => ClusterAccessError::Connect(other.to_string()),
    }
}
