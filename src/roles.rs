//! User roles and the topics each role may retrieve
//!
//! The mapping only filters search results; storage is never partitioned.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::RagError;
use crate::rag::topic::Topic;

/// Application roles, serialized as snake_case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    AdminSi,
    RiskManager,
    RiskAgent,
    Auditeur,
    AuditSenior,
    TopManagement,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::SuperAdmin,
        Role::AdminSi,
        Role::RiskManager,
        Role::RiskAgent,
        Role::Auditeur,
        Role::AuditSenior,
        Role::TopManagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::AdminSi => "admin_si",
            Role::RiskManager => "risk_manager",
            Role::RiskAgent => "risk_agent",
            Role::Auditeur => "auditeur",
            Role::AuditSenior => "audit_senior",
            Role::TopManagement => "top_management",
        }
    }

    /// Topics this role is allowed to retrieve
    pub fn allowed_topics(&self) -> &'static [Topic] {
        match self {
            Role::RiskManager | Role::RiskAgent => &[Topic::Risk, Topic::General],
            Role::Auditeur | Role::AuditSenior => &[Topic::Audit, Topic::General],
            Role::SuperAdmin | Role::AdminSi | Role::TopManagement => &Topic::ALL,
        }
    }

    pub fn allows(&self, topic: Topic) -> bool {
        self.allowed_topics().contains(&topic)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| RagError::InvalidInput(format!("Unknown role: {}", s)))
    }
}
