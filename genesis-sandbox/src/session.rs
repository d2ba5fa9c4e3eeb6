use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const DEFAULT_AGENT_ID: &str = "main";
pub const DEFAULT_MAIN_KEY: &str = "main";
pub const AGENT_KEY_PREFIX: &str = "agent";

/// Canonical form of an agent id: lowercase `[a-z0-9_-]`, with runs of any
/// other character collapsed to `-`. Blank ids become [`DEFAULT_AGENT_ID`].
pub fn normalize_agent_id(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for ch in raw.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '-') {
            if pending_dash {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        DEFAULT_AGENT_ID.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Split a composite `agent:<agentId>:<rest>` key. Returns `None` for plain
/// keys and for composites with an empty agent id or rest.
pub fn parse_agent_session_key(key: &str) -> Option<(&str, &str)> {
    let mut parts = key.trim().splitn(3, ':');
    let prefix = parts.next()?;
    if !prefix.eq_ignore_ascii_case(AGENT_KEY_PREFIX) {
        return None;
    }
    let agent = parts.next()?.trim();
    let rest = parts.next()?.trim();
    if agent.is_empty() || rest.is_empty() {
        return None;
    }
    Some((agent, rest))
}

/// A session key together with the agent it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub session_key: String,
    pub agent_id: String,
}

impl SessionIdentity {
    /// The agent comes from a composite key when present, otherwise from
    /// `default_agent`. Both are normalized.
    pub fn from_session_key(session_key: &str, default_agent: &str) -> Self {
        let agent = parse_agent_session_key(session_key)
            .map_or(default_agent, |(agent, _)| agent);
        Self {
            session_key: session_key.trim().to_owned(),
            agent_id: normalize_agent_id(agent),
        }
    }
}

/// Session keys that denote an agent's main session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainSessionAliases {
    aliases: BTreeSet<String>,
}

impl MainSessionAliases {
    pub fn new(main_key: Option<&str>) -> Self {
        let mut aliases = BTreeSet::from([DEFAULT_MAIN_KEY.to_owned()]);
        if let Some(key) = main_key.map(|key| key.trim().to_lowercase())
            && !key.is_empty()
        {
            aliases.insert(key);
        }
        Self { aliases }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.aliases.contains(&key.trim().to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }
}

impl Default for MainSessionAliases {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Whether a session is its agent's main session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionRole {
    Main,
    NonMain,
}

impl SessionRole {
    pub fn is_main(self) -> bool {
        self == Self::Main
    }
}

/// Classify a session. A key is main when it is an alias itself, or when it
/// is the composite `agent:<id>:<alias>` for the identity's own agent.
pub fn classify_session(identity: &SessionIdentity, aliases: &MainSessionAliases) -> SessionRole {
    if aliases.contains(&identity.session_key) {
        return SessionRole::Main;
    }
    match parse_agent_session_key(&identity.session_key) {
        Some((agent, rest))
            if normalize_agent_id(agent) == identity.agent_id && aliases.contains(rest) =>
        {
            SessionRole::Main
        }
        _ => SessionRole::NonMain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(key: &str, main_key: Option<&str>) -> SessionRole {
        let identity = SessionIdentity::from_session_key(key, DEFAULT_AGENT_ID);
        classify_session(&identity, &MainSessionAliases::new(main_key))
    }

    #[test]
    fn normalizes_agent_ids() {
        assert_eq!(normalize_agent_id("  Work Bot "), "work-bot");
        assert_eq!(normalize_agent_id("ops_team-2"), "ops_team-2");
        assert_eq!(normalize_agent_id("a::b//c"), "a-b-c");
        assert_eq!(normalize_agent_id("--x--"), "x");
        assert_eq!(normalize_agent_id(""), "main");
        assert_eq!(normalize_agent_id("!!!"), "main");
    }

    #[test]
    fn parses_composite_keys() {
        assert_eq!(
            parse_agent_session_key("agent:main:discord:42"),
            Some(("main", "discord:42"))
        );
        assert_eq!(parse_agent_session_key("Agent:Work:main"), Some(("Work", "main")));
        assert_eq!(parse_agent_session_key("agent::main"), None);
        assert_eq!(parse_agent_session_key("agent:main"), None);
        assert_eq!(parse_agent_session_key("telegram:7"), None);
    }

    #[test]
    fn identity_prefers_composite_agent() {
        let identity = SessionIdentity::from_session_key("agent:Ops:slack:1", "main");
        assert_eq!(identity.agent_id, "ops");
        let plain = SessionIdentity::from_session_key(" slack:1 ", "Work");
        assert_eq!(plain.agent_id, "work");
        assert_eq!(plain.session_key, "slack:1");
    }

    #[test]
    fn main_aliases_are_main() {
        assert_eq!(classify("main", None), SessionRole::Main);
        assert_eq!(classify(" MAIN ", None), SessionRole::Main);
        assert_eq!(classify("agent:main:main", None), SessionRole::Main);
        assert_eq!(classify("work", Some("work")), SessionRole::Main);
        assert_eq!(classify("agent:main:work", Some("work")), SessionRole::Main);
        assert_eq!(classify("agent:main:main", Some("work")), SessionRole::Main);
    }

    #[test]
    fn other_sessions_are_not_main() {
        assert_eq!(classify("work", None), SessionRole::NonMain);
        assert_eq!(classify("agent:main:discord:42", None), SessionRole::NonMain);
        assert_eq!(classify("telegram:7", Some("work")), SessionRole::NonMain);
    }

    #[test]
    fn composite_main_requires_matching_agent() {
        let identity = SessionIdentity {
            session_key: "agent:ops:main".into(),
            agent_id: "main".into(),
        };
        assert_eq!(
            classify_session(&identity, &MainSessionAliases::default()),
            SessionRole::NonMain
        );
        assert_eq!(classify("agent:ops:main", None), SessionRole::Main);
    }
}
