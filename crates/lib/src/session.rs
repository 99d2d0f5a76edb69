//! Session identity for one conversation with the agent.
//!
//! The id is an opaque random token generated once per app run; the fully
//! qualified name routes every turn of the conversation to the same agent
//! session on the backend.

use crate::config::AgentConfig;

/// One conversation: random id plus the agent-scoped session name.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque per-run token (UUIDv4).
    pub id: String,
    /// Fully qualified name: projects/{p}/locations/{l}/agents/{a}/sessions/{id}.
    pub name: String,
}

impl Session {
    /// Generate a new session bound to the given agent identity.
    pub fn new(project_id: &str, location_id: &str, agent_id: &str) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let name = [
            "projects",
            project_id,
            "locations",
            location_id,
            "agents",
            agent_id,
            "sessions",
            &id,
        ]
        .join("/");
        Self { id, name }
    }

    /// Generate a new session for the configured agent.
    pub fn for_agent(agent: &AgentConfig) -> Self {
        Self::new(&agent.project_id, &agent.location_id, &agent.agent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_name_joins_agent_path() {
        let s = Session::new("proj", "global", "agent-1");
        assert_eq!(
            s.name,
            format!("projects/proj/locations/global/agents/agent-1/sessions/{}", s.id)
        );
    }

    #[test]
    fn session_ids_are_unique_per_run() {
        let a = Session::new("p", "l", "a");
        let b = Session::new("p", "l", "a");
        assert_ne!(a.id, b.id);
    }
}
