//! Error and diagnostic reporting

use colored::*;

/// Message lines for an error and its causes; engine diagnostics in the
/// chain carry their line and column.
pub fn error_lines(error: &anyhow::Error) -> Vec<String> {
    error
        .chain()
        .map(|cause| match cause.downcast_ref::<hashnote::Error>() {
            Some(diagnostic) => {
                let pos = diagnostic.position();
                format!("{} (line {}, column {})", diagnostic, pos.line, pos.column)
            }
            None => cause.to_string(),
        })
        .collect()
}

/// Print a command failure with its cause chain
pub fn print_error(context: &str, error: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), context);
    let mut lines = error_lines(error).into_iter();
    if let Some(first) = lines.next() {
        eprintln!("  {}", first.as_str().red());
    }
    for cause in lines {
        eprintln!("  {} {}", "Caused by:".dimmed(), cause.as_str().dimmed());
    }
}

/// Print an error with a suggestion
pub fn print_error_with_suggestion(context: &str, error: &anyhow::Error, suggestion: &str) {
    print_error(context, error);
    eprintln!("\n{} {}", "Suggestion:".cyan().bold(), suggestion);
}

/// Print a non-fatal engine diagnostic found in `file`
pub fn print_diagnostic(file: &str, diagnostic: &hashnote::Error) {
    eprintln!("{} {}", "Warning:".yellow().bold(), format_diagnostic(file, diagnostic));
}

/// Format one engine diagnostic as `file:line:column: message`
pub fn format_diagnostic(file: &str, diagnostic: &hashnote::Error) -> String {
    let pos = diagnostic.position();
    format!("{}:{}:{}: {}", file, pos.line, pos.column, diagnostic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use hashnote::Position;

    #[test]
    fn test_error_lines_locate_engine_diagnostics() {
        let result: Result<(), hashnote::Error> = Err(hashnote::Error::AmbiguousAttachment {
            payload: "odd".into(),
            pos: Position::new(6, 1, 7),
        });
        let err = result.context("Failed to analyze call.js").unwrap_err();

        let lines = error_lines(&err);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Failed to analyze call.js");
        assert!(lines[1].ends_with("(line 1, column 7)"));
    }

    #[test]
    fn test_error_lines_plain_chain() {
        let err = anyhow::anyhow!("disk full").context("Failed to read a.js");
        assert_eq!(error_lines(&err), vec!["Failed to read a.js", "disk full"]);
    }
}
