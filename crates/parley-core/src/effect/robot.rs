//! Robot-control effect for the `robot` channel.
//!
//! A body wrapped in parentheses, e.g. `(action sit)`, is a structured
//! command and is forwarded verbatim. Anything else is a free-text
//! instruction sent to the controller's action entry point.

use std::future::Future;

use parley_types::error::EffectError;
use parley_types::identity::Identity;
use tracing::debug;

use super::handler::ChannelEffect;

/// Downstream robot controller.
pub trait RobotController: Send + Sync {
    /// Execute a structured command such as `(action sit)`.
    fn command(&self, command: &str)
    -> impl Future<Output = Result<Option<String>, EffectError>> + Send;

    /// Interpret a free-text instruction.
    fn action(
        &self,
        instruction: &str,
    ) -> impl Future<Output = Result<Option<String>, EffectError>> + Send;
}

/// How a robot-channel body will be forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotRequest<'a> {
    Command(&'a str),
    Action(&'a str),
}

/// Classify a body after trimming.
///
/// Parenthesised bodies must have balanced parentheses; an unbalanced one is
/// rejected instead of being sent to the controller.
pub fn classify(body: &str) -> Result<RobotRequest<'_>, EffectError> {
    let body = body.trim();
    if body.starts_with('(') && body.ends_with(')') {
        if parens_balanced(body) {
            Ok(RobotRequest::Command(body))
        } else {
            Err(EffectError::Malformed(format!("unbalanced command: {body}")))
        }
    } else {
        Ok(RobotRequest::Action(body))
    }
}

fn parens_balanced(text: &str) -> bool {
    let mut depth: usize = 0;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

/// Channel effect forwarding bodies to a [`RobotController`].
pub struct RobotEffect<C> {
    controller: C,
}

impl<C: RobotController> RobotEffect<C> {
    pub fn new(controller: C) -> Self {
        Self { controller }
    }
}

impl<C: RobotController> ChannelEffect for RobotEffect<C> {
    fn name(&self) -> &str {
        "robot"
    }

    async fn invoke(
        &self,
        sender: &Identity,
        channel: &str,
        body: &str,
    ) -> Result<Option<String>, EffectError> {
        match classify(body)? {
            RobotRequest::Command(command) => {
                debug!(%sender, %channel, %command, "forwarding robot command");
                self.controller.command(command).await
            }
            RobotRequest::Action(instruction) if instruction.is_empty() => Ok(None),
            RobotRequest::Action(instruction) => {
                debug!(%sender, %channel, "forwarding robot instruction");
                self.controller.action(instruction).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct RecordingController {
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl RobotController for RecordingController {
        async fn command(&self, command: &str) -> Result<Option<String>, EffectError> {
            self.calls
                .lock()
                .unwrap()
                .push(("command".to_string(), command.to_string()));
            Ok(Some("ok".to_string()))
        }

        async fn action(&self, instruction: &str) -> Result<Option<String>, EffectError> {
            self.calls
                .lock()
                .unwrap()
                .push(("action".to_string(), instruction.to_string()));
            Ok(None)
        }
    }

    #[test]
    fn classify_structured_and_free_text() {
        assert_eq!(
            classify("  (action sit) ").unwrap(),
            RobotRequest::Command("(action sit)")
        );
        assert_eq!(classify("hello").unwrap(), RobotRequest::Action("hello"));
        assert_eq!(
            classify("(not closed").unwrap(),
            RobotRequest::Action("(not closed")
        );
        assert_eq!(
            classify("(a (b c))").unwrap(),
            RobotRequest::Command("(a (b c))")
        );
    }

    #[test]
    fn classify_rejects_unbalanced_command() {
        assert!(matches!(classify("(a (b)"), Err(EffectError::Malformed(_))));
        assert!(matches!(classify("(a)) (b)"), Err(EffectError::Malformed(_))));
    }

    #[tokio::test]
    async fn structured_body_goes_to_command() {
        let controller = RecordingController::default();
        let effect = RobotEffect::new(controller.clone());

        let reply = effect
            .invoke(&"@a".into(), "robot", "(action sit)")
            .await
            .unwrap();

        assert_eq!(reply.as_deref(), Some("ok"));
        let calls = controller.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("command".to_string(), "(action sit)".to_string())]);
    }

    #[tokio::test]
    async fn free_text_goes_to_action() {
        let controller = RecordingController::default();
        let effect = RobotEffect::new(controller.clone());

        let reply = effect.invoke(&"@a".into(), "robot", "hello").await.unwrap();

        assert!(reply.is_none());
        let calls = controller.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("action".to_string(), "hello".to_string())]);
    }

    #[tokio::test]
    async fn malformed_command_never_reaches_controller() {
        let controller = RecordingController::default();
        let effect = RobotEffect::new(controller.clone());

        let result = effect.invoke(&"@a".into(), "robot", "(sit (down)").await;

        assert!(matches!(result, Err(EffectError::Malformed(_))));
        assert!(controller.calls.lock().unwrap().is_empty());
    }
}
