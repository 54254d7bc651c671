use devspace_api::{
    ClusterAccessClient, ClusterAccessError, ClusterRegistry, CredentialAssembler,
    SpaceAssignmentStore, UserStore,
};
use devspace_domain::{Cluster, ClusterAccessResult, SpaceAssignmentFilter};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::debug;

use super::error::ServiceAccountError;
use super::outcome::{ClusterProbeOutcome, ClusterProbeReport, ProbeStage};
use super::space_index::SpaceIndex;

/// 用户ServiceAccount所在的默认命名空间
pub const DEFAULT_SERVICE_ACCOUNT_NAMESPACE: &str = "devspace-reserved";

/// 聚合器配置
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    /// 用户ServiceAccount所在的命名空间
    pub service_account_namespace: String,
    /// 单集群探测超时
    pub probe_timeout: Duration,
    /// 整体截止时间
    pub overall_timeout: Duration,
    /// 只加载当前用户的开发空间
    pub scope_assignments_to_user: bool,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            service_account_namespace: DEFAULT_SERVICE_ACCOUNT_NAMESPACE.to_string(),
            probe_timeout: Duration::from_secs(15),
            overall_timeout: Duration::from_secs(60),
            scope_assignments_to_user: false,
        }
    }
}

/// 多集群授权聚合器
///
/// 对每个已注册集群并发探测用户的访问权限：
///
/// 1. 使用集群管理员kubeconfig建立连接
/// 2. 查找用户的ServiceAccount及其第一个Secret，组装受限kubeconfig
/// 3. 用受限kubeconfig做权限探测，成功即为集群管理员
/// 4. 否则枚举ServiceAccount可访问的命名空间，并与开发空间索引求交
///
/// 单个集群的任何失败都只会让该集群不产生结果，不影响其他集群。
pub struct AuthorizationAggregator {
    clusters: Arc<dyn ClusterRegistry>,
    users: Arc<dyn UserStore>,
    spaces: Arc<dyn SpaceAssignmentStore>,
    access: Arc<dyn ClusterAccessClient>,
    assembler: Arc<dyn CredentialAssembler>,
    settings: AggregatorSettings,
}

impl AuthorizationAggregator {
    pub fn new(
        clusters: Arc<dyn ClusterRegistry>,
        users: Arc<dyn UserStore>,
        spaces: Arc<dyn SpaceAssignmentStore>,
        access: Arc<dyn ClusterAccessClient>,
        assembler: Arc<dyn CredentialAssembler>,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            clusters,
            users,
            spaces,
            access,
            assembler,
            settings,
        }
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// 列出用户在所有集群上的访问结果，集群之间的顺序不固定
    pub async fn list_authorizations(
        &self,
        user_id: u64,
    ) -> Result<Vec<ClusterAccessResult>, ServiceAccountError> {
        let reports = self.probe_clusters(user_id).await?;
        Ok(reports
            .into_iter()
            .filter_map(|report| report.outcome.into_result())
            .collect())
    }

    /// 探测所有集群并返回每个集群的结果（包括失败原因）
    pub async fn probe_clusters(
        &self,
        user_id: u64,
    ) -> Result<Vec<ClusterProbeReport>, ServiceAccountError> {
        let clusters = self
            .clusters
            .list()
            .await
            .map_err(|e| ServiceAccountError::ClusterList(e.to_string()))?;

        let filter = if self.settings.scope_assignments_to_user {
            SpaceAssignmentFilter::for_user(user_id)
        } else {
            SpaceAssignmentFilter::default()
        };
        let assignments = self
            .spaces
            .list(filter)
            .await
            .map_err(|e| ServiceAccountError::SpaceList(e.to_string()))?;
        let index = SpaceIndex::build(assignments);

        let user = self
            .users
            .get_by_id(user_id)
            .await
            .map_err(|e| ServiceAccountError::UserLookup(e.to_string()))?
            .ok_or(ServiceAccountError::UserNotFound(user_id))?;

        debug!(
            user_id,
            clusters = clusters.len(),
            spaces = index.len(),
            "Probing clusters for user"
        );

        let probe = Arc::new(ClusterProbe {
            access: self.access.clone(),
            assembler: self.assembler.clone(),
            index,
            sa_name: user.sa_name,
            sa_namespace: self.settings.service_account_namespace.clone(),
        });

        let reports = self.run_probes(probe, clusters).await;
        for report in &reports {
            debug!(user_id, cluster_id = report.cluster_id, outcome = ?report.outcome, "Cluster probe finished");
        }
        Ok(reports)
    }

    async fn run_probes(&self, probe: Arc<ClusterProbe>, clusters: Vec<Cluster>) -> Vec<ClusterProbeReport> {
        let mut pending: HashSet<u64> = clusters.iter().map(|c| c.id).collect();
        let mut reports = Vec::with_capacity(clusters.len());
        let mut tasks = JoinSet::new();

        for cluster in clusters {
            let probe = probe.clone();
            let probe_timeout = self.settings.probe_timeout;
            tasks.spawn(async move {
                let outcome = match tokio::time::timeout(probe_timeout, probe.run(&cluster)).await {
                    Ok(outcome) => outcome,
                    Err(_) => ClusterProbeOutcome::TimedOut,
                };
                ClusterProbeReport {
                    cluster_id: cluster.id,
                    outcome,
                }
            });
        }

        let deadline = Instant::now() + self.settings.overall_timeout;
        let mut deadline_reached = false;
        loop {
            let next = tokio::time::timeout_at(deadline, tasks.join_next()).await;
            match next {
                Ok(Some(Ok(report))) => {
                    pending.remove(&report.cluster_id);
                    reports.push(report);
                }
                Ok(Some(Err(e))) => {
                    debug!(error = %e, "Cluster probe task did not complete");
                }
                Ok(None) => break,
                Err(_) => {
                    deadline_reached = true;
                    tasks.abort_all();
                    break;
                }
            }
        }

        // 超时被中止的任务以及异常退出的任务
        for cluster_id in pending {
            let outcome = if deadline_reached {
                ClusterProbeOutcome::TimedOut
            } else {
                ClusterProbeOutcome::Failed {
                    stage: ProbeStage::Task,
                    reason: "probe task aborted".to_string(),
                }
            };
            reports.push(ClusterProbeReport { cluster_id, outcome });
        }

        reports
    }
}

struct ProbeFailure {
    stage: ProbeStage,
    error: ClusterAccessError,
}

fn at(stage: ProbeStage) -> impl FnOnce(ClusterAccessError) -> ProbeFailure {
    move |error| ProbeFailure { stage, error }
}

/// 单个集群的探测上下文，在所有集群任务之间共享
struct ClusterProbe {
    access: Arc<dyn ClusterAccessClient>,
    assembler: Arc<dyn CredentialAssembler>,
    index: SpaceIndex,
    sa_name: String,
    sa_namespace: String,
}

impl ClusterProbe {
    async fn run(&self, cluster: &Cluster) -> ClusterProbeOutcome {
        match self.probe(cluster).await {
            Ok(Some(result)) => ClusterProbeOutcome::Authorized(result),
            Ok(None) => ClusterProbeOutcome::NoAccess,
            Err(failure) => ClusterProbeOutcome::Failed {
                stage: failure.stage,
                reason: failure.error.to_string(),
            },
        }
    }

    async fn probe(&self, cluster: &Cluster) -> Result<Option<ClusterAccessResult>, ProbeFailure> {
        let admin = self
            .access
            .connect_admin(cluster.kubeconfig_bytes())
            .await
            .map_err(at(ProbeStage::AdminHandle))?;

        let service_account = admin
            .get_service_account(&self.sa_name, &self.sa_namespace)
            .await
            .map_err(at(ProbeStage::ServiceAccount))?;
        let secret_name = service_account.first_secret().ok_or_else(|| ProbeFailure {
            stage: ProbeStage::ServiceAccount,
            error: ClusterAccessError::NoBoundSecret {
                namespace: self.sa_namespace.clone(),
                name: self.sa_name.clone(),
            },
        })?;

        let secret = admin
            .get_secret(secret_name, &self.sa_namespace)
            .await
            .map_err(at(ProbeStage::Secret))?;

        let kubeconfig = self
            .assembler
            .assemble(&secret, &cluster.server, &self.sa_namespace)
            .map_err(at(ProbeStage::Credential))?;
        if kubeconfig.trim().is_empty() {
            return Err(ProbeFailure {
                stage: ProbeStage::Credential,
                error: ClusterAccessError::Assemble("empty kubeconfig".to_string()),
            });
        }

        // 受限凭证本身能通过管理员校验，说明该用户是集群管理员
        if self.access.connect_admin(kubeconfig.as_bytes()).await.is_ok() {
            return Ok(Some(ClusterAccessResult::privileged(
                kubeconfig,
                cluster.storage_class.clone(),
            )));
        }

        let namespaces = admin
            .list_permitted_namespaces(&self.sa_name, &self.sa_namespace)
            .await
            .map_err(at(ProbeStage::NamespaceReview))?;
        let grants = self.index.grants_for(cluster.id, &namespaces);

        Ok(ClusterAccessResult::scoped(
            kubeconfig,
            cluster.storage_class.clone(),
            grants,
        ))
    }
}
