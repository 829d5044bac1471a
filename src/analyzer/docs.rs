//! Short field documentation attached to failures when docs are requested.

pub const POD_SCHEDULING: &str = "spec.nodeSelector, spec.affinity and spec.tolerations decide which nodes a Pod can be scheduled onto.";
pub const POD_CONTAINER_STATE: &str = "status.containerStatuses[].state: details about the container's current condition.";
pub const SERVICE_SELECTOR: &str = "spec.selector: Route service traffic to pods with label keys and values matching this selector.";
pub const INGRESS_CLASS: &str = "spec.ingressClassName: the name of an IngressClass cluster resource. The controller uses it to decide whether to serve this Ingress.";
pub const INGRESS_BACKEND: &str = "spec.rules[].http.paths[].backend.service: references a Service as a backend. The Service must exist in the same namespace as the Ingress.";
pub const DEPLOYMENT_REPLICAS: &str = "spec.replicas: number of desired pods. status.availableReplicas: pods available for at least minReadySeconds.";
pub const REPLICA_SET_FAILURE: &str = "status.conditions: ReplicaFailure is added when one of its pods fails to be created.";
pub const PVC_PHASE: &str = "status.phase: Pending claims wait for a matching PersistentVolume or a provisioner for spec.storageClassName.";
pub const STATEFUL_SET_SERVICE: &str = "spec.serviceName: the governing Service, which must exist before the StatefulSet.";
pub const CRON_JOB_SCHEDULE: &str = "spec.schedule: the schedule in Cron format.";
pub const CRON_JOB_SUSPEND: &str = "spec.suspend: tells the controller to suspend subsequent executions.";
pub const NODE_CONDITIONS: &str = "status.conditions: an array of current observed node conditions.";
pub const HPA_TARGET: &str = "spec.scaleTargetRef: points to the target resource to scale.";
pub const PDB_SELECTOR: &str = "spec.selector: label query over pods whose evictions are managed by the disruption budget.";
pub const NETWORK_POLICY_SELECTOR: &str = "spec.podSelector: selects the pods to which this NetworkPolicy applies. An empty podSelector selects all pods in the namespace.";
