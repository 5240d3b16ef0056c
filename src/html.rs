use crate::counter::SeverityCounts;
use crate::severity::Severity;
use crate::window::TimeWindow;

pub const DEFAULT_HTML_PATH: &str = "parse_result.html";
const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-latest.min.js";
const NUMERIC_CDN: &str = "https://cdnjs.cloudflare.com/ajax/libs/numeric/1.2.6/numeric.min.js";

pub fn render_html(file: &str, window: &TimeWindow, counts: &SeverityCounts) -> String {
    let mut s = String::new();
    s.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    s.push_str("\t<meta charset=\"utf-8\">\n\t<title>Log parse result</title>\n");
    s.push_str(&format!("\t<script src=\"{}\"></script>\n", PLOTLY_CDN));
    s.push_str(&format!("\t<script src=\"{}\"></script>\n", NUMERIC_CDN));
    s.push_str("</head>\n<body>\n");
    s.push_str(&format!("\t<h2>{}</h2>\n", html_escape(file)));
    s.push_str(&format!("\t<h3>Time interval: {}</h3>\n", html_escape(&window.describe())));
    s.push_str("\t<ul>\n");
    for sev in Severity::ALL { s.push_str(&format!("\t\t<li>{} - {}</li>\n", sev.label(), counts.get(sev))); }
    s.push_str("\t</ul>\n");
    s.push_str("\t<div id=\"myDiv\"></div>\n\t<script>\n\t\tvar data = [{\n");
    let values: Vec<String> = counts.values().iter().map(|v| v.to_string()).collect();
    s.push_str(&format!("\t\t\tvalues: [{}],\n", values.join(", ")));
    let labels: Vec<String> = Severity::ALL.iter().map(|sev| format!("'{}'", sev.label())).collect();
    s.push_str(&format!("\t\t\tlabels: [{}],\n", labels.join(", ")));
    s.push_str("\t\t\ttype: 'pie'\n\t\t}];\n\t\tPlotly.newPlot('myDiv', data);\n\t</script>\n");
    s.push_str("</body>\n</html>\n");
    s
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_pie_data_in_report_order() {
        let counts = SeverityCounts { traces: 0, debugs: 0, infos: 1, warnings: 0, errors: 1 };
        let html = render_html("app.log", &TimeWindow::default(), &counts);
        assert!(html.contains("values: [0, 0, 1, 0, 1]"));
        assert!(html.contains("labels: ['Traces', 'Debugs', 'Infos', 'Warnings', 'Errors']"));
        assert!(html.contains("type: 'pie'"));
        assert!(html.contains("<li>Infos - 1</li>"));
        assert!(html.contains("Time interval: From start till end of the file"));
        assert!(html.contains(PLOTLY_CDN) && html.contains(NUMERIC_CDN));
    }

    #[test]
    fn file_name_is_escaped() {
        let html = render_html("<b>&.log", &TimeWindow::default(), &SeverityCounts::default());
        assert!(html.contains("<h2>&lt;b&gt;&amp;.log</h2>"));
    }
}
