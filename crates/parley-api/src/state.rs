//! Server state wiring the router, topic bus, and channel effects together.

use std::sync::Arc;
use std::time::Duration;

use parley_core::admin::AdminCell;
use parley_core::effect::EffectRegistry;
use parley_core::effect::disabled::DisabledEffect;
use parley_core::effect::inference::InferenceEffect;
use parley_core::effect::robot::RobotEffect;
use parley_core::message::{MessageRouter, TopicBus};
use parley_infra::llm::AnthropicCompleter;
use parley_infra::robot::HttpRobotController;
use parley_types::config::ServerConfig;
use parley_types::identity::Identity;
use tokio_util::sync::CancellationToken;

/// Channel whose messages go to the inference backend.
pub const LLM_CHANNEL: &str = "llm";
/// Channel whose messages go to the robot controller.
pub const ROBOT_CHANNEL: &str = "robot";

/// Reply on the robot channel when the HTTP client cannot be built.
const ROBOT_UNAVAILABLE_TEXT: &str = "robot controller unavailable";

/// Shared server state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<MessageRouter<TopicBus>>,
    pub bus: TopicBus,
    pub channels: Arc<Vec<String>>,
    /// Cancelled on SIGINT/SIGTERM or a client `shutdown` frame.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let bus = TopicBus::new();
        let admin = Arc::new(AdminCell::new(Identity::new(config.default_admin.clone())));
        let router = MessageRouter::new(
            bus.clone(),
            config.topic_base.clone(),
            admin,
            build_effects(config),
        )
        .with_effect_timeout(Duration::from_secs(config.effect_timeout_secs.max(1)));

        Self {
            router: Arc::new(router),
            bus,
            channels: Arc::new(config.channels.clone()),
            shutdown: CancellationToken::new(),
        }
    }
}

/// Register the side effects for the special channels.
///
/// The inference backend is only built when the first `llm` message arrives.
pub fn build_effects(config: &ServerConfig) -> EffectRegistry {
    let effects = if config.llm_enabled {
        let llm = config.llm.clone();
        tracing::info!(model = %llm.model, "llm channel enabled");
        EffectRegistry::new().with(
            LLM_CHANNEL,
            InferenceEffect::new(move || AnthropicCompleter::from_config(&llm)),
        )
    } else {
        EffectRegistry::new().with(LLM_CHANNEL, DisabledEffect::llm())
    };

    match HttpRobotController::new(&config.robot) {
        Ok(controller) => effects.with(ROBOT_CHANNEL, RobotEffect::new(controller)),
        Err(err) => {
            tracing::warn!(error = %err, "robot controller unavailable");
            effects.with(ROBOT_CHANNEL, DisabledEffect::new(ROBOT_UNAVAILABLE_TEXT))
        }
    }
}
