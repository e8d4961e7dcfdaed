//! Light markup for agent replies in the data-domain widget.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern"));
static CHIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.*?)\]").expect("chip pattern"));

const CHIP_OPEN: &str = r#"<span class="inline-block border border-blue-500 text-blue-600 px-2 py-0.5 rounded-md text-xs font-semibold bg-white dark:bg-gray-800 mr-1 mb-1 align-middle" style="margin-right:2px;">"#;

/// `**bold**` to `<strong>`, `[tag]` to a chip, newlines to `<br />`, in that order.
///
/// Neither pattern spans a line break.
pub fn render_ai_text(text: &str) -> String {
    let formatted = BOLD.replace_all(text, r#"<strong class="font-bold">$1</strong>"#);
    let formatted = CHIP.replace_all(&formatted, format!("{CHIP_OPEN}$1</span>").as_str());
    formatted.replace('\n', "<br />")
}
