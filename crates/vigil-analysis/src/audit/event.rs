//! The subset of a Kubernetes audit event the summaries need.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    #[serde(rename = "auditID", default)]
    pub audit_id: String,
    #[serde(default)]
    pub verb: String,
    #[serde(default)]
    pub user: UserInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_ref: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<ResponseStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub api_group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStatus {
    #[serde(default)]
    pub code: i32,
}

impl AuditEvent {
    /// `resource.group`, or just `resource` for the core group. `None` for
    /// non-resource requests.
    pub fn group_resource(&self) -> Option<String> {
        let object_ref = self.object_ref.as_ref()?;
        if object_ref.resource.is_empty() {
            return None;
        }
        Some(if object_ref.api_group.is_empty() {
            object_ref.resource.clone()
        } else {
            format!("{}.{}", object_ref.resource, object_ref.api_group)
        })
    }

    /// HTTP status, 0 when the request never got a response.
    pub fn status_code(&self) -> i32 {
        self.response_status.as_ref().map_or(0, |s| s.code)
    }
}
