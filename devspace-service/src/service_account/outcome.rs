use devspace_domain::ClusterAccessResult;
use std::fmt;

/// 单集群探测所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeStage {
    AdminHandle,
    ServiceAccount,
    Secret,
    Credential,
    NamespaceReview,
    Task,
}

impl fmt::Display for ProbeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeStage::AdminHandle => "admin-handle",
            ProbeStage::ServiceAccount => "service-account",
            ProbeStage::Secret => "secret",
            ProbeStage::Credential => "credential",
            ProbeStage::NamespaceReview => "namespace-review",
            ProbeStage::Task => "task",
        };
        f.write_str(name)
    }
}

/// 单集群探测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterProbeOutcome {
    /// 用户在该集群上拥有管理员权限或至少一个开发空间
    Authorized(ClusterAccessResult),
    /// 探测成功但没有任何可访问的开发空间
    NoAccess,
    /// 探测过程中出错
    Failed { stage: ProbeStage, reason: String },
    /// 超过单集群超时或整体截止时间
    TimedOut,
}

impl ClusterProbeOutcome {
    pub fn is_authorized(&self) -> bool {
        matches!(self, ClusterProbeOutcome::Authorized(_))
    }

    pub fn into_result(self) -> Option<ClusterAccessResult> {
        match self {
            ClusterProbeOutcome::Authorized(result) => Some(result),
            _ => None,
        }
    }
}

/// 带集群ID的探测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterProbeReport {
    pub cluster_id: u64,
    pub outcome: ClusterProbeOutcome,
}
