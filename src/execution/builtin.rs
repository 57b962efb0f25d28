//! Demo Actions
//!
//! Small actions for trying the engine from the command line:
//!
//! | id            | behaviour                                              |
//! |---------------|--------------------------------------------------------|
//! | `echo`        | returns its input                                      |
//! | `print`       | prints its input, returns it                           |
//! | `add_random`  | returns its input plus a random `value` in `0..1000`   |
//! | `fail_random` | fails if input has `fail`, fails half the time if it has `random` |

use log::debug;
use rand::Rng;
use serde_json::json;

use super::action::{ActionError, ActionRegistry, ActionResult};
use super::context::Context;
use crate::workflow::Document;

/// Probability in percent that `fail_random` fails when `random` is set.
const RANDOM_FAIL_PERCENT: u32 = 50;

/// Registry containing every demo action.
pub fn demo_registry() -> ActionRegistry {
    ActionRegistry::builder()
        .register("echo", echo)
        .register("print", print)
        .register("add_random", add_random)
        .register("fail_random", fail_random)
        .build()
}

pub fn echo(_: &Context, input: &Document) -> ActionResult {
    Ok(input.clone())
}

pub fn print(ctx: &Context, input: &Document) -> ActionResult {
    println!(
        "[step {}] arguments passed: {}",
        ctx.step().map_or_else(|| "-".to_string(), |s| s.to_string()),
        serde_json::Value::Object(input.clone())
    );
    Ok(input.clone())
}

pub fn add_random(_: &Context, input: &Document) -> ActionResult {
    let mut output = input.clone();
    let value = rand::thread_rng().gen_range(0..1000);
    output.insert("value".to_string(), json!(value));

    debug!("add_random produced {}", value);
    Ok(output)
}

pub fn fail_random(_: &Context, input: &Document) -> ActionResult {
    if input.contains_key("fail") {
        return Err(ActionError::new("permanent fail"));
    }

    if input.contains_key("random") && rand::thread_rng().gen_range(0..100) < RANDOM_FAIL_PERCENT {
        return Err(ActionError::new("random fail"));
    }

    Ok(input.clone())
}
