//! HTML views.
//!
//! Templates are compiled in with `include_str!` and filled by a single pass
//! over `__KEY__` placeholders. Substituted values are never rescanned, so a
//! value containing `__PAGE__` stays literal. Callers pass values that are
//! already escaped; every helper here escapes user-supplied text itself.

use nifki_core::PageName;

use crate::schema::views::{EditView, GameView};

const LAYOUT: &str = include_str!("../templates/layout.html");
const WELCOME: &str = include_str!("../templates/welcome-to-nifki.html");
const PAGE_LIST: &str = include_str!("../templates/list-of-all-pages.html");
const EDITING: &str = include_str!("../templates/editing.html");
const PLAYING: &str = include_str!("../templates/playing.html");
const COMPILER_OUTPUT: &str = include_str!("../templates/compiler-output.html");
const COMPILER_ERROR: &str = include_str!("../templates/compiler-error.html");
const NO_SUCH_PAGE: &str = include_str!("../templates/no-such-page.html");
const ERROR: &str = include_str!("../templates/error.html");

/// Images per row in the editor's picture table.
pub const IMAGE_COLUMNS: usize = 5;

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Replaces each `__KEY__` that names an entry of `vars`. Unknown keys are
/// left as they are.
pub fn fill(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("__") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let hit = after.find("__").and_then(|end| {
            let key = &after[..end];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (end, value))
        });
        match hit {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("__");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn layout(title: &str, body: String) -> String {
    fill(LAYOUT, &[("TITLE", escape_html(title)), ("BODY", body)])
}

pub fn welcome() -> String {
    layout("Welcome", WELCOME.to_string())
}

pub fn page_list(pages: &[PageName]) -> String {
    let items: String = pages
        .iter()
        .map(|page| format!("    <li><a href=\"/pages/{page}/\">{page}</a></li>\n"))
        .collect();
    layout("List of all pages", fill(PAGE_LIST, &[("PAGES", items)]))
}

fn image_table(page: &PageName, resources: &[String]) -> String {
    if resources.is_empty() {
        return "    <p>No pictures</p>\n".to_string();
    }
    let mut html = String::from("    <table class=\"pictures\">\n");
    for row in resources.chunks(IMAGE_COLUMNS) {
        html.push_str("      <tr>\n");
        for name in row {
            let name = escape_html(name);
            html.push_str(&format!(
                "        <td><img src=\"/pages/{page}/res/{name}\" alt=\"{name}\"><br>{name}</td>\n"
            ));
        }
        for _ in row.len()..IMAGE_COLUMNS {
            html.push_str("        <td></td>\n");
        }
        html.push_str("      </tr>\n");
    }
    html.push_str("    </table>\n");
    html
}

pub fn edit_form(view: &EditView) -> String {
    let error = match &view.error_message {
        Some(message) => {
            let message = escape_html(message);
            format!("  <p class=\"error\" align=\"center\">{message}</p>\n")
        }
        None => String::new(),
    };
    let values = &view.values;
    let checked = if values.debug { " checked" } else { "" };
    let body = fill(
        EDITING,
        &[
            ("PAGE", view.page.to_string()),
            ("ERROR", error),
            ("CSRF_TOKEN", escape_html(&view.csrf_token)),
            ("NAME", escape_html(&values.name)),
            ("WIDTH", escape_html(&values.width)),
            ("HEIGHT", escape_html(&values.height)),
            ("MS_PER_FRAME", escape_html(&values.ms_per_frame)),
            ("DEBUG_CHECKED", checked.to_string()),
            ("SOURCE", escape_html(&values.source)),
            ("NEWPAGE", escape_html(&values.newpage)),
            ("IMAGES", image_table(&view.page, &view.resources)),
        ],
    );
    layout(&format!("Editing {}", view.page), body)
}

pub fn playing(view: &GameView) -> String {
    let resources = if view.resources.is_empty() {
        String::new()
    } else {
        let page = &view.page;
        let items: String = view
            .resources
            .iter()
            .map(|name| {
                let name = escape_html(name);
                format!("    <li><a href=\"/pages/{page}/res/{name}\">{name}</a></li>\n")
            })
            .collect();
        format!("  <ul class=\"resources\">\n{items}  </ul>\n")
    };
    let body = fill(
        PLAYING,
        &[
            ("PAGE", view.page.to_string()),
            ("TAGLINE", escape_html(&view.tagline)),
            ("RANDOM", view.random.to_string()),
            ("WIDTH", view.width.to_string()),
            ("HEIGHT", view.height.to_string()),
            ("MS_PER_FRAME", view.frame_interval_ms.to_string()),
            ("RESOURCES", resources),
        ],
    );
    layout(view.page.as_str(), body)
}

/// The wrapped compiler diagnostics of a failed build.
pub fn compiler_output(page: &PageName, text: &str) -> String {
    let body = fill(
        COMPILER_OUTPUT,
        &[("PAGE", page.to_string()), ("ERR", escape_html(text))],
    );
    layout(page.as_str(), body)
}

/// Shown when the save went through but the compiler could not run.
pub fn compiler_error() -> String {
    layout("Compiler error", COMPILER_ERROR.to_string())
}

pub fn no_such_page(page: &PageName) -> String {
    let body = fill(NO_SUCH_PAGE, &[("PAGE", page.to_string())]);
    layout(page.as_str(), body)
}

pub fn error_page(status: u16, message: &str) -> String {
    let body = fill(
        ERROR,
        &[
            ("STATUS", status.to_string()),
            ("MESSAGE", escape_html(message)),
        ],
    );
    layout(&format!("Error {status}"), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::views::FormValues;

    fn page(s: &str) -> PageName {
        PageName::parse(s).unwrap()
    }

    #[test]
    fn fill_is_single_pass() {
        let out = fill(
            "<h1>__A__</h1>__B__",
            &[("A", "__B__".to_string()), ("B", "x".to_string())],
        );
        assert_eq!(out, "<h1>__B__</h1>x");
    }

    #[test]
    fn fill_keeps_unknown_and_unclosed_markers() {
        assert_eq!(fill("a__NOPE__b", &[]), "a__NOPE__b");
        let out = fill("snake__case", &[("case", "x".to_string())]);
        assert_eq!(out, "snake__case");
        assert_eq!(fill("___A__", &[("A", "x".to_string())]), "___A__");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<a href=\"x\">&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    fn edit_view(resources: &[&str], error: Option<&str>) -> EditView {
        EditView {
            page: page("mygame"),
            error_message: error.map(str::to_string),
            values: FormValues {
                name: "<b>bold</b>".to_string(),
                width: "256".to_string(),
                height: "256".to_string(),
                ms_per_frame: "40".to_string(),
                debug: true,
                source: "if a < b".to_string(),
                newpage: "mygame".to_string(),
            },
            resources: resources.iter().map(|s| s.to_string()).collect(),
            csrf_token: "abc123".to_string(),
        }
    }

    #[test]
    fn edit_form_escapes_values_and_shows_error() {
        let html = edit_view_html(&[], Some("Upload file not provided."));
        assert!(html.contains("<title>Editing mygame - Nifki</title>"));
        assert!(html.contains("value=\"&lt;b&gt;bold&lt;/b&gt;\""));
        assert!(html.contains(">if a &lt; b</textarea>"));
        assert!(html.contains(" checked>"));
        let error = "<p class=\"error\" align=\"center\">Upload file not provided.</p>";
        assert!(html.contains(error));
        assert!(html.contains("No pictures"));
        assert!(html.contains("name=\"csrf_token\" value=\"abc123\""));
    }

    fn edit_view_html(resources: &[&str], error: Option<&str>) -> String {
        edit_form(&edit_view(resources, error))
    }

    #[test]
    fn image_table_pads_last_row() {
        let html = edit_view_html(&["a1", "b1", "c1", "d1", "e1", "f1", "g1"], None);
        assert_eq!(html.matches("<tr>").count(), 2);
        assert_eq!(html.matches("<td></td>").count(), 3);
        assert!(html.contains("<img src=\"/pages/mygame/res/f1\""));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn playing_view_carries_cache_buster() {
        let html = playing(&GameView {
            page: page("mygame"),
            tagline: "Shoot & run".to_string(),
            width: 320,
            height: 200,
            frame_interval_ms: 30,
            resources: vec!["logo".to_string()],
            random: 1_700_000_000,
        });
        assert!(html.contains("/pages/mygame/1700000000.jar"));
        assert!(html.contains("width=\"320\" height=\"200\""));
        assert!(html.contains("value=\"30\""));
        assert!(html.contains("Shoot &amp; run"));
        assert!(html.contains("/pages/mygame/res/logo"));
    }

    #[test]
    fn diagnostics_are_escaped() {
        let html = compiler_output(&page("mygame"), "expected <expr>");
        assert!(html.contains("expected &lt;expr&gt;"));
    }

    #[test]
    fn error_page_shows_status_and_message() {
        let html = error_page(404, "Bad page name '<x>'");
        assert!(html.contains("Error 404"));
        assert!(html.contains("Bad page name &#39;&lt;x&gt;&#39;"));
    }

    #[test]
    fn page_list_links_every_page() {
        let html = page_list(&[page("alpha"), page("beta")]);
        assert!(html.contains("<a href=\"/pages/alpha/\">alpha</a>"));
        assert!(html.contains("<a href=\"/pages/beta/\">beta</a>"));
    }
}
