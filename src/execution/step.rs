//! Individual Step Execution
//!
//! Invokes a single action with its step input and turns a panic inside the
//! action into an ordinary [`ActionError`], so the engine can still
//! checkpoint the step as failed.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, error};

use super::action::{Action, ActionError, ActionResult};
use super::context::Context;
use crate::workflow::Document;

/// Executes one step.
///
/// # Arguments
///
/// * `action` - The action registered for this step
/// * `ctx` - Step context (run id, step index, cancellation)
/// * `input` - The step's input document
///
/// # Returns
///
/// * `Ok(Document)` - Output of a successful action
/// * `Err(ActionError)` - The action's error, or a panic converted to one
pub fn execute_step(action: &dyn Action, ctx: &Context, input: &Document) -> ActionResult {
    let step_name = ctx.action_id().unwrap_or("<anonymous>");

    let result = panic::catch_unwind(AssertUnwindSafe(|| action.execute(ctx, input)))
        .unwrap_or_else(|payload| {
            Err(ActionError::new(format!(
                "action panicked: {}",
                panic_message(&*payload)
            )))
        });

    match &result {
        Ok(output) => {
            debug!("Step '{}' returned {} output keys", step_name, output.len());
        }
        Err(e) => {
            error!("Step '{}' failed: {}", step_name, e);
            if let Some(output) = e.output() {
                debug!("Step '{}' partial output: {:?}", step_name, output);
            }
        }
    }

    result
}

/// Extracts the message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::to_document;
    use serde_json::json;

    fn ctx() -> Context {
        Context::background().for_step("run-1", 0, "test")
    }

    #[test]
    fn test_execute_step_success() {
        let action = |_: &Context, input: &Document| -> ActionResult { Ok(input.clone()) };
        let input = to_document(json!({"a": 1}));

        let output = execute_step(&action, &ctx(), &input).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_execute_step_error_passthrough() {
        let action = |_: &Context, _: &Document| -> ActionResult {
            Err(ActionError::new("permanent fail"))
        };

        let err = execute_step(&action, &ctx(), &Document::new()).unwrap_err();
        assert_eq!(err.message(), "permanent fail");
    }

    #[test]
    fn test_execute_step_catches_panic() {
        let action = |_: &Context, _: &Document| -> ActionResult { panic!("kaboom") };

        let err = execute_step(&action, &ctx(), &Document::new()).unwrap_err();
        assert!(err.message().contains("panicked"));
        assert!(err.message().contains("kaboom"));
    }

    #[test]
    fn test_execute_step_catches_formatted_panic() {
        let action = |_: &Context, _: &Document| -> ActionResult { panic!("bad value {}", 3) };

        let err = execute_step(&action, &ctx(), &Document::new()).unwrap_err();
        assert!(err.message().contains("bad value 3"));
    }

    #[test]
    fn test_execute_step_receives_context() {
        let action = |ctx: &Context, _: &Document| -> ActionResult {
            Ok(to_document(json!({
                "run": ctx.run_id(),
                "step": ctx.step(),
            })))
        };

        let output = execute_step(&action, &ctx(), &Document::new()).unwrap();
        assert_eq!(output["run"], json!("run-1"));
        assert_eq!(output["step"], json!(0));
    }
}
