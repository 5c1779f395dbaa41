use entrystore_core::domain::EntryRecord;
use entrystore_core::usecases::{EntriesResponse, EntryResponse, ErrorBody};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);

    /// Reports an error body returned by the store
    fn store_error(&self, error: &ErrorBody) {
        self.error(&format!(
            "{} ({}): {}",
            error.name, error.code, error.description
        ));
    }
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter),
    }
}

/// Lines describing an entry and its audit trail
pub fn entry_lines(entry: &EntryRecord) -> Vec<String> {
    let mut lines = vec![
        format!("Key:      {}", entry.key()),
        format!("Identity: {}", entry.identity()),
        format!("Payload:  {}", entry.payload()),
    ];
    if !entry.audits().is_empty() {
        lines.push("Audits:".to_string());
        for event in entry.audits().iter() {
            lines.push(format!(
                "  #{:<3} {:<7} {}",
                event.sequence_id(),
                event.action().code(),
                event.timestamp().to_rfc3339()
            ));
        }
    }
    lines
}

/// Prints a single-entry response; `verb` describes the succeeded action
pub fn print_entry_response(format: OutputFormat, response: &EntryResponse, verb: &str) {
    let formatter = get_formatter(format);

    if format == OutputFormat::Json {
        match serde_json::to_value(response) {
            Ok(json) => formatter.print_json(&json),
            Err(e) => formatter.error(&format!("Failed to encode response: {}", e)),
        }
        return;
    }

    match (&response.entry, &response.error) {
        (_, Some(error)) => formatter.store_error(error),
        (Some(entry), None) => {
            formatter.success(&format!("{} entry '{}'", verb, entry.key()));
            for line in entry_lines(entry) {
                formatter.info(&line);
            }
        }
        (None, None) => formatter.success(verb),
    }
}

/// Prints a listing response
pub fn print_entries_response(format: OutputFormat, response: &EntriesResponse) {
    let formatter = get_formatter(format);

    if format == OutputFormat::Json {
        match serde_json::to_value(response) {
            Ok(json) => formatter.print_json(&json),
            Err(e) => formatter.error(&format!("Failed to encode response: {}", e)),
        }
        return;
    }

    if let Some(error) = &response.error {
        formatter.store_error(error);
        return;
    }

    formatter.success(&format!(
        "{} of {} entries ({} page{})",
        response.entries.len(),
        response.total_entries,
        response.total_pages,
        if response.total_pages == 1 { "" } else { "s" }
    ));
    for entry in &response.entries {
        formatter.info(&format!(
            "{:<24} {:<36} {}",
            entry.key(),
            entry.identity(),
            entry.payload()
        ));
    }
}
