use crate::counter::SeverityCounts;
use crate::severity::Severity;
use crate::window::TimeWindow;

pub fn render_markdown(file: &str, window: &TimeWindow, counts: &SeverityCounts) -> String {
    let mut s = String::new();
    s.push_str("# Log parse result\n\n");
    s.push_str(&format!("File: `{}`\n\n", file));
    s.push_str(&format!("Time interval: {}\n\n", window.describe()));
    s.push_str("| Level | Count |\n|---|---:|\n");
    for sev in Severity::ALL { s.push_str(&format!("| {} | {} |\n", sev.label(), counts.get(sev))); }
    s.push_str(&format!("\nTotal: {}\n", counts.total()));
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_level_and_total() {
        let counts = SeverityCounts { traces: 3, debugs: 0, infos: 2, warnings: 1, errors: 4 };
        let w = TimeWindow::from_args(None, Some("2023-01-01 00:00:00")).unwrap();
        let md = render_markdown("a.log", &w, &counts);
        assert!(md.contains("| Traces | 3 |"));
        assert!(md.contains("| Errors | 4 |"));
        assert!(md.contains("Time interval: From start of log file till 2023-01-01 00:00:00"));
        assert!(md.ends_with("Total: 10\n"));
    }
}
