//! Styled status lines

use super::context::UiContext;
use console::style;
use std::io::{self, Write};

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        eprintln!("  {} {}", style("✓").green(), message);
    } else {
        eprintln!("  [OK] {}", message);
    }
}

/// Display an info step
pub fn step_info(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        eprintln!("  {} {}", style("•").cyan(), message);
    } else {
        eprintln!("  [INFO] {}", message);
    }
}

/// Display a warning step
pub fn step_warn(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        eprintln!("  {} {}", style("!").yellow(), message);
    } else {
        eprintln!("  [WARN] {}", message);
    }
}

/// Ask a yes/no question, defaulting to no
///
/// Auto-approved with `--yes`; declined when stdin cannot be read.
pub fn confirm(ctx: &UiContext, question: &str) -> bool {
    if ctx.auto_yes() {
        return true;
    }

    eprint!("{} [y/N] ", question);
    let _ = io::stderr().flush();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("y")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_non_interactive() {
        let ctx = UiContext::non_interactive();
        step_ok(&ctx, "Step completed");
        step_info(&ctx, "Info");
        step_warn(&ctx, "Warning");
    }

    #[test]
    fn confirm_auto_yes() {
        let ctx = UiContext::non_interactive().with_auto_yes(true);
        assert!(confirm(&ctx, "Proceed?"));
    }
}
