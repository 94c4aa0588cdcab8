//! Configuration types for Parley.
//!
//! `ParleyConfig` represents the top-level `config.toml`. Every field has a
//! default so an empty or missing file yields a working local setup.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.parley/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

/// Settings for `parley run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Namespace every outbound topic is derived from (`<topic_base>/<recipient>`).
    #[serde(default = "default_topic_base")]
    pub topic_base: String,
    /// Admin identity until an `/admin` directive replaces it.
    #[serde(default = "default_admin")]
    pub default_admin: String,
    /// Channel names advertised to clients.
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,
    /// Upper bound on a single side-effect invocation.
    #[serde(default = "default_effect_timeout_secs")]
    pub effect_timeout_secs: u64,
    /// Whether the `llm` channel calls a real inference backend.
    #[serde(default)]
    pub llm_enabled: bool,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub robot: RobotConfig,
}

/// Inference backend used by the `llm` channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

/// Robot-control collaborator used by the `robot` channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    #[serde(default = "default_robot_base_url")]
    pub base_url: String,
}

/// Settings for `parley repl` / `parley send` / `parley exit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_identity")]
    pub identity: String,
    #[serde(default = "default_channel")]
    pub default_channel: String,
    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,
}

/// Settings for `parley bot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_bot_identity")]
    pub identity: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Reply template; `{identity}` is replaced with the bot's identity.
    #[serde(default = "default_bot_reply")]
    pub reply: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7878
}

fn default_topic_base() -> String {
    "parley/chat".to_string()
}

fn default_admin() -> String {
    "@admin".to_string()
}

fn default_channels() -> Vec<String> {
    ["general", "llm", "robot", "yolo"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_effect_timeout_secs() -> u64 {
    30
}

fn default_llm_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_llm_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_robot_base_url() -> String {
    "http://127.0.0.1:8090".to_string()
}

fn default_server_url() -> String {
    "ws://127.0.0.1:7878/ws".to_string()
}

fn default_identity() -> String {
    "@user".to_string()
}

fn default_channel() -> String {
    "general".to_string()
}

fn default_discovery_timeout_secs() -> u64 {
    5
}

fn default_bot_identity() -> String {
    "@@bot".to_string()
}

fn default_bot_reply() -> String {
    "Hello, I am {identity}!".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            topic_base: default_topic_base(),
            default_admin: default_admin(),
            channels: default_channels(),
            effect_timeout_secs: default_effect_timeout_secs(),
            llm_enabled: false,
            llm: LlmConfig::default(),
            robot: RobotConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            system_prompt: None,
        }
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            base_url: default_robot_base_url(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            identity: default_identity(),
            default_channel: default_channel(),
            discovery_timeout_secs: default_discovery_timeout_secs(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            identity: default_bot_identity(),
            channel: default_channel(),
            reply: default_bot_reply(),
        }
    }
}

impl BotConfig {
    /// Render the reply template for this bot.
    pub fn render_reply(&self) -> String {
        self.reply.replace("{identity}", &self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = ParleyConfig::default();
        assert_eq!(config.server.port, 7878);
        assert_eq!(config.server.topic_base, "parley/chat");
        assert_eq!(config.server.default_admin, "@admin");
        assert!(!config.server.llm_enabled);
        assert_eq!(config.client.default_channel, "general");
        assert_eq!(config.bot.identity, "@@bot");
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: ParleyConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.channels, vec!["general", "llm", "robot", "yolo"]);
        assert_eq!(config.client.discovery_timeout_secs, 5);
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
[server]
port = 9000
llm_enabled = true
default_admin = "@root"

[server.robot]
base_url = "http://robot.local:8000"

[client]
identity = "@dana"

[bot]
identity = "@@echo"
reply = "{identity} here"
"#;
        let config: ParleyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(config.server.llm_enabled);
        assert_eq!(config.server.default_admin, "@root");
        assert_eq!(config.server.robot.base_url, "http://robot.local:8000");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.client.identity, "@dana");
        assert_eq!(config.bot.render_reply(), "@@echo here");
    }

    #[test]
    fn test_default_bot_reply_mentions_identity() {
        let bot = BotConfig::default();
        assert_eq!(bot.render_reply(), "Hello, I am @@bot!");
    }
}
