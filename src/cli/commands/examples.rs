//! Examples command - list sample learning goals.

use crate::cli::Output;
use crate::config::EXAMPLE_GOALS;

/// Print the example learning goals.
pub fn run_examples() {
    Output::header("Example learning goals");
    println!();
    for goal in EXAMPLE_GOALS {
        Output::list_item(goal);
    }
    println!();
    Output::info("Try: learnpath generate \"I want to learn Python basics in 3 days\"");
}
