use async_trait::async_trait;
use devspace_api::{
    AssignmentError, AssignmentService, ClusterAccessClient, ClusterAccessError, ClusterHandle,
    ClusterRegistry, CredentialAssembler, ServiceAccountInfo, ServiceAccountSecret,
    SpaceAssignmentStore, UserStore,
};
use devspace_domain::{
    Cluster, ClusterAccessResult, NamespaceGrant, SpaceAssignment, SpaceAssignmentFilter, User,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;

const SA_NAMESPACE: &str = "devspace-reserved";
const USER_ID: u64 = 1;
const SA_NAME: &str = "devspace-sa-1";

/// 单个假集群的行为
#[derive(Clone)]
struct ClusterBehavior {
    reachable: bool,
    has_service_account: bool,
    has_secret: bool,
    token: String,
    privileged: bool,
    permitted: Vec<String>,
    review_fails: bool,
    delay: Option<Duration>,
}

impl ClusterBehavior {
    fn new(cluster_id: u64) -> Self {
        Self {
            reachable: true,
            has_service_account: true,
            has_secret: true,
            token: format!("scoped-{}", cluster_id),
            privileged: false,
            permitted: Vec::new(),
            review_fails: false,
            delay: None,
        }
    }

    fn permitting(mut self, namespaces: &[&str]) -> Self {
        self.permitted = namespaces.iter().map(|ns| ns.to_string()).collect();
        self
    }

    fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }
}

struct FakeRegistry {
    clusters: Vec<Cluster>,
    fail: bool,
}

#[async_trait]
impl ClusterRegistry for FakeRegistry {
    async fn list(&self) -> Result<Vec<Cluster>, Box<dyn std::error::Error + Send + Sync>> {
        if self.fail {
            return Err("database unavailable".into());
        }
        Ok(self.clusters.clone())
    }

    async fn get(&self, id: u64) -> Result<Option<Cluster>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.clusters.iter().find(|c| c.id == id).cloned())
    }
}

struct FakeUsers {
    users: HashMap<u64, User>,
}

#[async_trait]
impl UserStore for FakeUsers {
    async fn get_by_id(&self, id: u64) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.users.get(&id).cloned())
    }
}

struct FakeSpaces {
    assignments: Vec<SpaceAssignment>,
    fail: bool,
    filters: Mutex<Vec<SpaceAssignmentFilter>>,
}

#[async_trait]
impl SpaceAssignmentStore for FakeSpaces {
    async fn list(
        &self,
        filter: SpaceAssignmentFilter,
    ) -> Result<Vec<SpaceAssignment>, Box<dyn std::error::Error + Send + Sync>> {
        if self.fail {
            return Err("dev space table missing".into());
        }
        self.filters.lock().unwrap().push(filter.clone());
        Ok(self
            .assignments
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }
}

/// 管理员kubeconfig为`admin-<id>`，受限kubeconfig为`scoped-<id>`
struct FakeAccess {
    behaviors: HashMap<u64, ClusterBehavior>,
    review_calls: Arc<AtomicUsize>,
}

fn parse_id(raw: &str, prefix: &str) -> Option<u64> {
    raw.strip_prefix(prefix)?.parse().ok()
}

#[async_trait]
impl ClusterAccessClient for FakeAccess {
    async fn connect_admin(&self, kubeconfig: &[u8]) -> Result<Arc<dyn ClusterHandle>, ClusterAccessError> {
        let raw = std::str::from_utf8(kubeconfig)
            .map_err(|e| ClusterAccessError::InvalidKubeconfig(e.to_string()))?;

        if let Some(id) = parse_id(raw, "admin-") {
            let behavior = self
                .behaviors
                .get(&id)
                .cloned()
                .ok_or_else(|| ClusterAccessError::Connect(format!("unknown cluster {}", id)))?;
            if let Some(delay) = behavior.delay {
                tokio::time::sleep(delay).await;
            }
            if !behavior.reachable {
                return Err(ClusterAccessError::Connect("connection refused".to_string()));
            }
            return Ok(Arc::new(FakeHandle {
                behavior,
                review_calls: self.review_calls.clone(),
            }));
        }

        if let Some(id) = parse_id(raw, "scoped-") {
            return match self.behaviors.get(&id) {
                Some(behavior) if behavior.privileged => Ok(Arc::new(FakeHandle {
                    behavior: behavior.clone(),
                    review_calls: self.review_calls.clone(),
                })),
                _ => Err(ClusterAccessError::NotClusterAdmin),
            };
        }

        Err(ClusterAccessError::InvalidKubeconfig(raw.to_string()))
    }
}

struct FakeHandle {
    behavior: ClusterBehavior,
    review_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ClusterHandle for FakeHandle {
    async fn get_service_account(&self, name: &str, namespace: &str) -> Result<ServiceAccountInfo, ClusterAccessError> {
        if !self.behavior.has_service_account {
            return Err(ClusterAccessError::not_found("ServiceAccount", namespace, name));
        }
        Ok(ServiceAccountInfo {
            name: name.to_string(),
            namespace: namespace.to_string(),
            secrets: vec![format!("{}-token", name)],
        })
    }

    async fn get_secret(&self, name: &str, namespace: &str) -> Result<ServiceAccountSecret, ClusterAccessError> {
        if !self.behavior.has_secret {
            return Err(ClusterAccessError::not_found("Secret", namespace, name));
        }
        let mut data = BTreeMap::new();
        data.insert("token".to_string(), self.behavior.token.clone().into_bytes());
        Ok(ServiceAccountSecret {
            name: name.to_string(),
            namespace: namespace.to_string(),
            data,
        })
    }

    async fn list_permitted_namespaces(&self, sa_name: &str, sa_namespace: &str) -> Result<Vec<String>, ClusterAccessError> {
        assert_eq!(sa_name, SA_NAME);
        assert_eq!(sa_namespace, SA_NAMESPACE);
        self.review_calls.fetch_add(1, Ordering::SeqCst);
        if self.behavior.review_fails {
            return Err(ClusterAccessError::Api("forbidden".to_string()));
        }
        Ok(self.behavior.permitted.clone())
    }
}

/// 直接把令牌当作kubeconfig返回
struct FakeAssembler;

impl CredentialAssembler for FakeAssembler {
    fn assemble(&self, secret: &ServiceAccountSecret, _server: &str, namespace: &str) -> Result<String, ClusterAccessError> {
        assert_eq!(namespace, SA_NAMESPACE);
        secret.token().map(str::to_string)
    }
}

fn cluster(id: u64) -> Cluster {
    Cluster {
        id,
        name: format!("cluster-{}", id),
        kubeconfig: format!("admin-{}", id),
        server: format!("https://10.0.0.{}:6443", id),
        storage_class: format!("sc-{}", id),
    }
}

fn space(id: u64, cluster_id: u64, namespace: &str, name: &str) -> SpaceAssignment {
    SpaceAssignment {
        id,
        cluster_id,
        user_id: USER_ID,
        namespace: namespace.to_string(),
        space_name: name.to_string(),
    }
}

struct Fixture {
    clusters: Vec<Cluster>,
    behaviors: HashMap<u64, ClusterBehavior>,
    assignments: Vec<SpaceAssignment>,
    settings: AggregatorSettings,
    registry_fails: bool,
    spaces_fail: bool,
    with_user: bool,
}

impl Fixture {
    fn new() -> Self {
        Self {
            clusters: Vec::new(),
            behaviors: HashMap::new(),
            assignments: Vec::new(),
            settings: AggregatorSettings::default(),
            registry_fails: false,
            spaces_fail: false,
            with_user: true,
        }
    }

    fn cluster(mut self, behavior: ClusterBehavior, id: u64) -> Self {
        self.clusters.push(cluster(id));
        self.behaviors.insert(id, behavior);
        self
    }

    fn space(mut self, assignment: SpaceAssignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    fn build(self) -> Harness {
        let review_calls = Arc::new(AtomicUsize::new(0));
        let spaces = Arc::new(FakeSpaces {
            assignments: self.assignments,
            fail: self.spaces_fail,
            filters: Mutex::new(Vec::new()),
        });
        let mut users = HashMap::new();
        if self.with_user {
            users.insert(USER_ID, User::new(USER_ID, "alice", "alice@example.com", SA_NAME));
        }

        let aggregator = AuthorizationAggregator::new(
            Arc::new(FakeRegistry {
                clusters: self.clusters,
                fail: self.registry_fails,
            }),
            Arc::new(FakeUsers { users }),
            spaces.clone(),
            Arc::new(FakeAccess {
                behaviors: self.behaviors,
                review_calls: review_calls.clone(),
            }),
            Arc::new(FakeAssembler),
            self.settings,
        );

        Harness {
            aggregator,
            spaces,
            review_calls,
        }
    }
}

struct Harness {
    aggregator: AuthorizationAggregator,
    spaces: Arc<FakeSpaces>,
    review_calls: Arc<AtomicUsize>,
}

fn outcome_for(reports: &[ClusterProbeReport], cluster_id: u64) -> &ClusterProbeOutcome {
    &reports
        .iter()
        .find(|r| r.cluster_id == cluster_id)
        .expect("cluster report missing")
        .outcome
}

fn sorted_by_kubeconfig(mut results: Vec<ClusterAccessResult>) -> Vec<ClusterAccessResult> {
    results.sort_by(|a, b| a.kubeconfig.cmp(&b.kubeconfig));
    results
}

#[tokio::test]
async fn test_single_namespace_grant() {
    let harness = Fixture::new()
        .cluster(ClusterBehavior::new(1).permitting(&["dev"]), 1)
        .space(space(11, 1, "dev", "team-a"))
        .build();

    let results = harness.aggregator.list_authorizations(USER_ID).await.unwrap();

    assert_eq!(
        results,
        vec![ClusterAccessResult {
            kubeconfig: "scoped-1".to_string(),
            storage_class: "sc-1".to_string(),
            grants: vec![NamespaceGrant {
                space_id: 11,
                namespace: "dev".to_string(),
                space_name: "team-a".to_string(),
            }],
            privilege: false,
        }]
    );
}

#[tokio::test]
async fn test_privileged_cluster_skips_namespace_review() {
    let harness = Fixture::new()
        .cluster(ClusterBehavior::new(1).privileged().permitting(&["dev"]), 1)
        .space(space(11, 1, "dev", "team-a"))
        .build();

    let results = harness.aggregator.list_authorizations(USER_ID).await.unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].privilege);
    assert!(results[0].grants.is_empty());
    assert_eq!(results[0].kubeconfig, "scoped-1");
    assert_eq!(harness.review_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_cluster_is_dropped_silently() {
    let harness = Fixture::new()
        .cluster(ClusterBehavior::new(1).unreachable(), 1)
        .space(space(11, 1, "dev", "team-a"))
        .build();

    let results = harness.aggregator.list_authorizations(USER_ID).await.unwrap();
    assert!(results.is_empty());

    let reports = harness.aggregator.probe_clusters(USER_ID).await.unwrap();
    assert!(matches!(
        outcome_for(&reports, 1),
        ClusterProbeOutcome::Failed { stage: ProbeStage::AdminHandle, .. }
    ));
}

#[tokio::test]
async fn test_unknown_namespaces_never_appear() {
    let harness = Fixture::new()
        .cluster(ClusterBehavior::new(1).permitting(&["default", "dev", "kube-system"]), 1)
        .space(space(11, 1, "dev", "team-a"))
        // 其他集群上的同名开发空间不应匹配
        .space(space(12, 2, "default", "other-cluster"))
        .build();

    let results = harness.aggregator.list_authorizations(USER_ID).await.unwrap();

    assert_eq!(results.len(), 1);
    let namespaces: Vec<&str> = results[0].grants.iter().map(|g| g.namespace.as_str()).collect();
    assert_eq!(namespaces, vec!["dev"]);
}

#[tokio::test]
async fn test_cluster_without_grants_is_absent() {
    let harness = Fixture::new()
        .cluster(ClusterBehavior::new(1).permitting(&["default"]), 1)
        .space(space(11, 1, "dev", "team-a"))
        .build();

    let results = harness.aggregator.list_authorizations(USER_ID).await.unwrap();
    assert!(results.is_empty());

    let reports = harness.aggregator.probe_clusters(USER_ID).await.unwrap();
    assert_eq!(outcome_for(&reports, 1), &ClusterProbeOutcome::NoAccess);
}

#[tokio::test]
async fn test_partial_failure_isolation() {
    let harness = Fixture::new()
        .cluster(ClusterBehavior::new(1).unreachable(), 1)
        .cluster(ClusterBehavior::new(2).permitting(&["dev"]), 2)
        .space(space(11, 1, "dev", "team-a"))
        .space(space(21, 2, "dev", "team-b"))
        .build();

    let results = harness.aggregator.list_authorizations(USER_ID).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kubeconfig, "scoped-2");
    assert_eq!(results[0].storage_class, "sc-2");
    assert_eq!(results[0].grants[0].space_name, "team-b");
}

#[tokio::test]
async fn test_soft_failures_report_their_stage() {
    let mut no_sa = ClusterBehavior::new(1).permitting(&["dev"]);
    no_sa.has_service_account = false;
    let mut no_secret = ClusterBehavior::new(2).permitting(&["dev"]);
    no_secret.has_secret = false;
    let mut empty_credential = ClusterBehavior::new(3).permitting(&["dev"]);
    empty_credential.token = "   ".to_string();
    let mut review_fails = ClusterBehavior::new(4).permitting(&["dev"]);
    review_fails.review_fails = true;

    let harness = Fixture::new()
        .cluster(no_sa, 1)
        .cluster(no_secret, 2)
        .cluster(empty_credential, 3)
        .cluster(review_fails, 4)
        .space(space(11, 1, "dev", "a"))
        .space(space(21, 2, "dev", "b"))
        .space(space(31, 3, "dev", "c"))
        .space(space(41, 4, "dev", "d"))
        .build();

    let reports = harness.aggregator.probe_clusters(USER_ID).await.unwrap();
    assert_eq!(reports.len(), 4);

    let stage = |id| match outcome_for(&reports, id) {
        ClusterProbeOutcome::Failed { stage, .. } => Some(*stage),
        _ => None,
    };
    assert_eq!(stage(1), Some(ProbeStage::ServiceAccount));
    assert_eq!(stage(2), Some(ProbeStage::Secret));
    assert_eq!(stage(3), Some(ProbeStage::Credential));
    assert_eq!(stage(4), Some(ProbeStage::NamespaceReview));

    assert!(harness.aggregator.list_authorizations(USER_ID).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_many_clusters_yield_exactly_successful_entries() {
    let mut fixture = Fixture::new();
    let mut expected = 0;
    for id in 1..=60u64 {
        let behavior = match id % 3 {
            0 => {
                expected += 1;
                ClusterBehavior::new(id).permitting(&["dev"])
            }
            1 => {
                expected += 1;
                ClusterBehavior::new(id).privileged()
            }
            _ => ClusterBehavior::new(id).unreachable(),
        };
        fixture = fixture.cluster(behavior, id).space(space(id * 10, id, "dev", "team"));
    }
    let harness = fixture.build();

    let results = harness.aggregator.list_authorizations(USER_ID).await.unwrap();
    assert_eq!(results.len(), expected);

    let mut kubeconfigs: Vec<&str> = results.iter().map(|r| r.kubeconfig.as_str()).collect();
    kubeconfigs.sort_unstable();
    kubeconfigs.dedup();
    assert_eq!(kubeconfigs.len(), expected);

    let reports = harness.aggregator.probe_clusters(USER_ID).await.unwrap();
    assert_eq!(reports.len(), 60);
}

#[tokio::test]
async fn test_repeated_listing_is_stable() {
    let harness = Fixture::new()
        .cluster(ClusterBehavior::new(1).permitting(&["dev", "test"]), 1)
        .cluster(ClusterBehavior::new(2).privileged(), 2)
        .cluster(ClusterBehavior::new(3).unreachable(), 3)
        .space(space(11, 1, "dev", "team-a"))
        .space(space(12, 1, "test", "team-a-test"))
        .build();

    let first = sorted_by_kubeconfig(harness.aggregator.list_authorizations(USER_ID).await.unwrap());
    let second = sorted_by_kubeconfig(harness.aggregator.list_authorizations(USER_ID).await.unwrap());

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_slow_cluster_times_out_without_blocking_others() {
    let mut slow = ClusterBehavior::new(1).permitting(&["dev"]);
    slow.delay = Some(Duration::from_secs(30));

    let mut fixture = Fixture::new()
        .cluster(slow, 1)
        .cluster(ClusterBehavior::new(2).permitting(&["dev"]), 2)
        .space(space(11, 1, "dev", "team-a"))
        .space(space(21, 2, "dev", "team-b"));
    fixture.settings.probe_timeout = Duration::from_millis(100);
    let harness = fixture.build();

    let reports = harness.aggregator.probe_clusters(USER_ID).await.unwrap();

    assert_eq!(outcome_for(&reports, 1), &ClusterProbeOutcome::TimedOut);
    assert!(outcome_for(&reports, 2).is_authorized());
}

#[tokio::test]
async fn test_overall_deadline_aborts_pending_probes() {
    let mut slow = ClusterBehavior::new(1).permitting(&["dev"]);
    slow.delay = Some(Duration::from_secs(30));

    let mut fixture = Fixture::new()
        .cluster(slow, 1)
        .cluster(ClusterBehavior::new(2).privileged(), 2)
        .space(space(11, 1, "dev", "team-a"));
    fixture.settings.probe_timeout = Duration::from_secs(60);
    fixture.settings.overall_timeout = Duration::from_millis(200);
    let harness = fixture.build();

    let reports = harness.aggregator.probe_clusters(USER_ID).await.unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(outcome_for(&reports, 1), &ClusterProbeOutcome::TimedOut);
    assert!(outcome_for(&reports, 2).is_authorized());
}

#[tokio::test]
async fn test_dropping_listing_cancels_probes() {
    let mut slow = ClusterBehavior::new(1).permitting(&["dev"]);
    slow.delay = Some(Duration::from_millis(300));

    let harness = Fixture::new()
        .cluster(slow, 1)
        .space(space(11, 1, "dev", "team-a"))
        .build();

    let listing = tokio::time::timeout(
        Duration::from_millis(50),
        harness.aggregator.list_authorizations(USER_ID),
    )
    .await;
    assert!(listing.is_err());

    // 探测任务若仍在运行，此时早已进入命名空间检查
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(harness.review_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cluster_list_failure_is_fatal() {
    let mut fixture = Fixture::new().cluster(ClusterBehavior::new(1).privileged(), 1);
    fixture.registry_fails = true;
    let harness = fixture.build();

    let err = harness.aggregator.list_authorizations(USER_ID).await.unwrap_err();
    assert!(matches!(err, ServiceAccountError::ClusterList(_)));
}

#[tokio::test]
async fn test_space_list_failure_is_fatal() {
    let mut fixture = Fixture::new().cluster(ClusterBehavior::new(1).privileged(), 1);
    fixture.spaces_fail = true;
    let harness = fixture.build();

    let err = harness.aggregator.list_authorizations(USER_ID).await.unwrap_err();
    assert!(matches!(err, ServiceAccountError::SpaceList(_)));
}

#[tokio::test]
async fn test_missing_user_is_fatal() {
    let mut fixture = Fixture::new().cluster(ClusterBehavior::new(1).privileged(), 1);
    fixture.with_user = false;
    let harness = fixture.build();

    let err = harness.aggregator.list_authorizations(USER_ID).await.unwrap_err();
    assert!(matches!(err, ServiceAccountError::UserNotFound(USER_ID)));
}

#[tokio::test]
async fn test_no_clusters_returns_empty_list() {
    let harness = Fixture::new().build();
    assert!(harness.aggregator.list_authorizations(USER_ID).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_assignment_filter_follows_settings() {
    let harness = Fixture::new().build();
    harness.aggregator.list_authorizations(USER_ID).await.unwrap();
    assert_eq!(
        harness.spaces.filters.lock().unwrap().last(),
        Some(&SpaceAssignmentFilter::default())
    );

    let mut fixture = Fixture::new();
    fixture.settings.scope_assignments_to_user = true;
    let harness = fixture.build();
    harness.aggregator.list_authorizations(USER_ID).await.unwrap();
    assert_eq!(
        harness.spaces.filters.lock().unwrap().last(),
        Some(&SpaceAssignmentFilter::for_user(USER_ID))
    );
}

struct RecordingAssignments {
    calls: Mutex<Vec<(u64, u64, String)>>,
    fail_with_missing_cluster: bool,
}

#[async_trait]
impl AssignmentService for RecordingAssignments {
    async fn authorize_namespace(&self, cluster_id: u64, user_id: u64, space_name: &str) -> Result<(), AssignmentError> {
        self.calls
            .lock()
            .unwrap()
            .push((cluster_id, user_id, space_name.to_string()));
        if self.fail_with_missing_cluster {
            return Err(AssignmentError::ClusterNotFound(cluster_id));
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_authorize_forwards_to_assignment_service() {
    let harness = Fixture::new().build();
    let assignments = Arc::new(RecordingAssignments {
        calls: Mutex::new(Vec::new()),
        fail_with_missing_cluster: false,
    });
    let service = DefaultServiceAccountService::new(Arc::new(harness.aggregator), assignments.clone());

    service.authorize(3, USER_ID, "dev").await.unwrap();
    service.authorize(3, USER_ID, "dev").await.unwrap();

    assert_eq!(
        assignments.calls.lock().unwrap().as_slice(),
        &[(3, USER_ID, "dev".to_string()), (3, USER_ID, "dev".to_string())]
    );
}

#[tokio::test]
async fn test_authorize_propagates_errors() {
    let harness = Fixture::new().build();
    let assignments = Arc::new(RecordingAssignments {
        calls: Mutex::new(Vec::new()),
        fail_with_missing_cluster: true,
    });
    let service = DefaultServiceAccountService::new(Arc::new(harness.aggregator), assignments);

    let err = service.authorize(9, USER_ID, "dev").await.unwrap_err();
    assert!(matches!(
        err,
        ServiceAccountError::Assignment(AssignmentError::ClusterNotFound(9))
    ));
}

#[tokio::test]
async fn test_service_lists_through_aggregator() {
    let harness = Fixture::new()
        .cluster(ClusterBehavior::new(1).permitting(&["dev"]), 1)
        .space(space(11, 1, "dev", "team-a"))
        .build();
    let assignments = Arc::new(RecordingAssignments {
        calls: Mutex::new(Vec::new()),
        fail_with_missing_cluster: false,
    });
    let service = DefaultServiceAccountService::new(Arc::new(harness.aggregator), assignments);

    let results = service.list_authorizations(USER_ID).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].grants[0].space_id, 11);
}
