// Number and label-template formatting for data labels.
//
// Number patterns follow the editor's numeral-style conventions: "0",
// "0.00", "0,0", "0,0.00", "0[.]00", "0.00%". Unrecognized patterns fall
// back to plain display.

use crate::series::Point;
use crate::value::{normalize, Value};

/// Format a number against a numeral-style pattern.
pub fn format_number(value: f64, pattern: &str) -> String {
    let mut pattern = pattern.trim();

    let percent = pattern.ends_with('%');
    if percent {
        pattern = &pattern[..pattern.len() - 1];
    }
    let value = if percent { value * 100.0 } else { value };

    let thousands = pattern.contains(',');

    // Fraction part: ".00" fixed, "[.]00" optional (trailing zeros trimmed)
    let (decimals, optional) = if let Some(idx) = pattern.find("[.]") {
        (count_zeros(&pattern[idx + 3..]), true)
    } else if let Some(idx) = pattern.find('.') {
        (count_zeros(&pattern[idx + 1..]), false)
    } else {
        (0, false)
    };

    let negative = value < 0.0;
    let mut formatted = format!("{:.*}", decimals, value.abs());

    if optional && decimals > 0 {
        while formatted.ends_with('0') {
            formatted.pop();
        }
        if formatted.ends_with('.') {
            formatted.pop();
        }
    }

    if thousands {
        formatted = group_thousands(&formatted);
    }

    let sign = if negative { "-" } else { "" };
    let suffix = if percent { "%" } else { "" };
    format!("{}{}{}", sign, formatted, suffix)
}

fn count_zeros(s: &str) -> usize {
    s.chars().take_while(|&c| c == '0').count()
}

fn group_thousands(formatted: &str) -> String {
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}

/// Everything a label template can reference for one point.
pub struct LabelContext<'a> {
    pub point: &'a Point,
    /// Shaped y value (post stacking/percent passes).
    pub y: Option<f64>,
    pub y_percent: Option<f64>,
    pub number_format: &'a str,
    pub percent_format: &'a str,
}

/// Default template when the options carry none.
pub fn default_label_template(percent_values: bool) -> &'static str {
    if percent_values {
        "{{ @@yPercent }}"
    } else {
        "{{ @@y }}"
    }
}

/// Render a `{{ ... }}` label template for one point.
///
/// `@@x`/`@@y`/`@@yPercent`/`@@size` reference the mapped roles; any other
/// name references the originating row's column. Unknown references render
/// empty.
pub fn format_label(template: &str, ctx: &LabelContext<'_>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                output.push_str(&resolve_placeholder(after[..end].trim(), ctx));
                rest = &after[end + 2..];
            }
            None => {
                // Unterminated placeholder, keep literal
                output.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    output.push_str(rest);
    output
}

fn resolve_placeholder(name: &str, ctx: &LabelContext<'_>) -> String {
    match name {
        "@@x" => ctx.point.x.to_string(),
        "@@y" => match ctx.y {
            Some(y) => format_number(y, ctx.number_format),
            None => ctx.point.y.to_string(),
        },
        "@@yPercent" => match ctx.y_percent {
            Some(p) => format_number(p / 100.0, ctx.percent_format),
            None => String::new(),
        },
        "@@size" => ctx.point.size.to_string(),
        column => match ctx.point.raw_row.get(column) {
            Some(raw) => normalize(raw).to_string(),
            None => String::new(),
        },
    }
}
