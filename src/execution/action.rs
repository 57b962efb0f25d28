//! Actions and the Action Registry
//!
//! An [`Action`] is a caller-supplied unit of work. The [`ActionRegistry`]
//! maps identifiers to actions and is frozen once built, so it can be shared
//! by every run a [`Manager`](super::Manager) drives.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use super::context::Context;
use crate::workflow::Document;

/// Result of one action invocation.
pub type ActionResult = Result<Document, ActionError>;

/// Failure reported by an action.
///
/// May carry the partial output produced before the failure; the engine
/// stores it in the step's output slot.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct ActionError {
    message: String,
    output: Option<Document>,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            output: None,
        }
    }

    /// Attaches the output produced before the failure.
    pub fn with_output(mut self, output: Document) -> Self {
        self.output = Some(output);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn output(&self) -> Option<&Document> {
        self.output.as_ref()
    }
}

/// A unit of work: `(context, input) -> output | error`.
///
/// Actions should be idempotent or tolerate at-least-once execution: a step
/// interrupted after it started is invoked again on resume.
pub trait Action: Send + Sync {
    fn execute(&self, ctx: &Context, input: &Document) -> ActionResult;
}

impl<F> Action for F
where
    F: Fn(&Context, &Document) -> ActionResult + Send + Sync,
{
    fn execute(&self, ctx: &Context, input: &Document) -> ActionResult {
        self(ctx, input)
    }
}

/// Immutable mapping from action identifier to action.
///
/// Identifiers keep their registration order, which defines the step order
/// of [`Manager::execute_all`](super::Manager::execute_all).
///
/// # Example
///
/// ```
/// use durable_runner::execution::{ActionRegistry, ActionResult, Context};
/// use durable_runner::workflow::Document;
///
/// let registry = ActionRegistry::builder()
///     .register("echo", |_: &Context, input: &Document| -> ActionResult {
///         Ok(input.clone())
///     })
///     .build();
///
/// assert!(registry.contains("echo"));
/// ```
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Box<dyn Action>>,
    order: Vec<String>,
}

impl ActionRegistry {
    pub fn builder() -> ActionRegistryBuilder {
        ActionRegistryBuilder::default()
    }

    /// Builds a registry from a fixed list of actions.
    ///
    /// Actions are registered under `"0"`, `"1"`, ... in list order.
    pub fn from_sequence<I>(actions: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Action>>,
    {
        actions
            .into_iter()
            .enumerate()
            .fold(Self::builder(), |builder, (index, action)| {
                builder.register_boxed(index.to_string(), action)
            })
            .build()
    }

    pub fn get(&self, id: &str) -> Option<&dyn Action> {
        self.actions.get(id).map(|action| &**action)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.actions.contains_key(id)
    }

    /// Registered identifiers in registration order.
    pub fn identifiers(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.order)
            .finish()
    }
}

/// Collects actions before freezing them into an [`ActionRegistry`].
#[derive(Default)]
pub struct ActionRegistryBuilder {
    registry: ActionRegistry,
}

impl ActionRegistryBuilder {
    /// Registers `action` under `id`. A repeated id replaces the earlier
    /// action but keeps its original position.
    pub fn register(self, id: impl Into<String>, action: impl Action + 'static) -> Self {
        self.register_boxed(id, Box::new(action))
    }

    pub fn register_boxed(mut self, id: impl Into<String>, action: Box<dyn Action>) -> Self {
        let id = id.into();
        if self.registry.actions.insert(id.clone(), action).is_none() {
            self.registry.order.push(id);
        }
        self
    }

    pub fn build(self) -> ActionRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::to_document;
    use serde_json::json;

    fn echo(_: &Context, input: &Document) -> ActionResult {
        Ok(input.clone())
    }

    fn fail(_: &Context, _: &Document) -> ActionResult {
        Err(ActionError::new("nope").with_output(to_document(json!({"partial": true}))))
    }

    #[test]
    fn test_register_and_get() {
        let registry = ActionRegistry::builder()
            .register("echo", echo)
            .register("fail", fail)
            .build();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.identifiers(), ["echo", "fail"]);

        let input = to_document(json!({"a": 1}));
        let output = registry
            .get("echo")
            .unwrap()
            .execute(&Context::background(), &input)
            .unwrap();
        assert_eq!(output, input);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_reregister_keeps_position() {
        let registry = ActionRegistry::builder()
            .register("a", echo)
            .register("b", echo)
            .register("a", fail)
            .build();

        assert_eq!(registry.identifiers(), ["a", "b"]);
        let result = registry
            .get("a")
            .unwrap()
            .execute(&Context::background(), &Document::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_from_sequence_uses_indices() {
        let registry = ActionRegistry::from_sequence(vec![
            Box::new(echo) as Box<dyn Action>,
            Box::new(fail) as Box<dyn Action>,
        ]);

        assert_eq!(registry.identifiers(), ["0", "1"]);
        assert!(registry.contains("1"));
    }

    #[test]
    fn test_action_error_output() {
        let err = fail(&Context::background(), &Document::new()).unwrap_err();
        assert_eq!(err.message(), "nope");
        assert_eq!(err.to_string(), "nope");
        assert_eq!(err.output().unwrap()["partial"], json!(true));
    }

    #[test]
    fn test_closure_action() {
        let offset = 10;
        let registry = ActionRegistry::builder()
            .register("add", move |_: &Context, input: &Document| -> ActionResult {
                let value = input.get("value").and_then(|v| v.as_i64()).unwrap_or(0);
                Ok(to_document(json!({ "value": value + offset })))
            })
            .build();

        let output = registry
            .get("add")
            .unwrap()
            .execute(&Context::background(), &to_document(json!({"value": 5})))
            .unwrap();
        assert_eq!(output["value"], json!(15));
    }

    #[test]
    fn test_registry_debug_lists_ids() {
        let registry = ActionRegistry::builder().register("echo", echo).build();
        assert!(format!("{:?}", registry).contains("echo"));
    }
}
