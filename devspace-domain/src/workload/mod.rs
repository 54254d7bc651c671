use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 工作负载类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
    Pod,
}

impl WorkloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "deployment",
            WorkloadKind::StatefulSet => "statefulset",
            WorkloadKind::DaemonSet => "daemonset",
            WorkloadKind::Job => "job",
            WorkloadKind::CronJob => "cronjob",
            WorkloadKind::Pod => "pod",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported workload kind: {0}")]
pub struct UnknownWorkloadKind(pub String);

impl FromStr for WorkloadKind {
    type Err = UnknownWorkloadKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deployment" => Ok(WorkloadKind::Deployment),
            "statefulset" => Ok(WorkloadKind::StatefulSet),
            "daemonset" => Ok(WorkloadKind::DaemonSet),
            "job" => Ok(WorkloadKind::Job),
            "cronjob" => Ok(WorkloadKind::CronJob),
            "pod" => Ok(WorkloadKind::Pod),
            _ => Err(UnknownWorkloadKind(s.to_string())),
        }
    }
}

/// 开发模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevModeType {
    /// 直接替换原工作负载
    #[default]
    Replace,
    /// 复制一份工作负载进行开发
    Duplicate,
}

/// 工作负载控制器变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerVariant {
    Deployment,
    DuplicateDeployment,
    StatefulSet,
    DuplicateStatefulSet,
    DaemonSet,
    DuplicateDaemonSet,
    Job,
    CronJob,
    RawPod,
    DuplicateRawPod,
}

impl ControllerVariant {
    /// 根据工作负载类型和开发模式选择控制器
    /// Job和CronJob不区分开发模式
    pub fn select(kind: WorkloadKind, mode: DevModeType) -> Self {
        let duplicate = mode == DevModeType::Duplicate;
        match kind {
            WorkloadKind::Deployment if duplicate => ControllerVariant::DuplicateDeployment,
            WorkloadKind::Deployment => ControllerVariant::Deployment,
            WorkloadKind::StatefulSet if duplicate => ControllerVariant::DuplicateStatefulSet,
            WorkloadKind::StatefulSet => ControllerVariant::StatefulSet,
            WorkloadKind::DaemonSet if duplicate => ControllerVariant::DuplicateDaemonSet,
            WorkloadKind::DaemonSet => ControllerVariant::DaemonSet,
            WorkloadKind::Job => ControllerVariant::Job,
            WorkloadKind::CronJob => ControllerVariant::CronJob,
            WorkloadKind::Pod if duplicate => ControllerVariant::DuplicateRawPod,
            WorkloadKind::Pod => ControllerVariant::RawPod,
        }
    }

    /// 控制器操作的工作负载类型
    pub fn workload_kind(&self) -> WorkloadKind {
        match self {
            ControllerVariant::Deployment | ControllerVariant::DuplicateDeployment => WorkloadKind::Deployment,
            ControllerVariant::StatefulSet | ControllerVariant::DuplicateStatefulSet => WorkloadKind::StatefulSet,
            ControllerVariant::DaemonSet | ControllerVariant::DuplicateDaemonSet => WorkloadKind::DaemonSet,
            ControllerVariant::Job => WorkloadKind::Job,
            ControllerVariant::CronJob => WorkloadKind::CronJob,
            ControllerVariant::RawPod | ControllerVariant::DuplicateRawPod => WorkloadKind::Pod,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            ControllerVariant::DuplicateDeployment
                | ControllerVariant::DuplicateStatefulSet
                | ControllerVariant::DuplicateDaemonSet
                | ControllerVariant::DuplicateRawPod
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [WorkloadKind; 6] = [
        WorkloadKind::Deployment,
        WorkloadKind::StatefulSet,
        WorkloadKind::DaemonSet,
        WorkloadKind::Job,
        WorkloadKind::CronJob,
        WorkloadKind::Pod,
    ];

    #[test]
    fn test_replace_mode_selects_plain_controllers() {
        for kind in ALL_KINDS {
            let variant = ControllerVariant::select(kind, DevModeType::Replace);
            assert!(!variant.is_duplicate());
            assert_eq!(variant.workload_kind(), kind);
        }
    }

    #[test]
    fn test_duplicate_mode() {
        assert_eq!(
            ControllerVariant::select(WorkloadKind::Deployment, DevModeType::Duplicate),
            ControllerVariant::DuplicateDeployment
        );
        assert_eq!(
            ControllerVariant::select(WorkloadKind::Pod, DevModeType::Duplicate),
            ControllerVariant::DuplicateRawPod
        );
        // Job和CronJob没有复制模式
        assert_eq!(
            ControllerVariant::select(WorkloadKind::Job, DevModeType::Duplicate),
            ControllerVariant::Job
        );
        assert_eq!(
            ControllerVariant::select(WorkloadKind::CronJob, DevModeType::Duplicate),
            ControllerVariant::CronJob
        );
    }

    #[test]
    fn test_workload_kind_parse() {
        assert_eq!("StatefulSet".parse::<WorkloadKind>(), Ok(WorkloadKind::StatefulSet));
        assert_eq!("cronjob".parse::<WorkloadKind>(), Ok(WorkloadKind::CronJob));
        assert!("replicaset".parse::<WorkloadKind>().is_err());

        for kind in ALL_KINDS {
            assert_eq!(kind.to_string().parse::<WorkloadKind>(), Ok(kind));
        }
    }
}
