//! Text output formatting with colors.

use gomarket_core::CartItem;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    title_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            title_width: 32,
        }
    }

    /// Set the title column width.
    #[cfg(test)]
    pub(crate) fn with_title_width(mut self, width: usize) -> Self {
        self.title_width = width;
        self
    }

    /// Formats the cart as a table followed by a count line.
    pub fn format_cart(&self, items: &[CartItem]) -> String {
        if items.is_empty() {
            return self.dim("Cart is empty");
        }

        let mut lines = Vec::with_capacity(items.len() + 3);
        lines.push(self.bold(&format!(
            "{:>4}  {:<width$}  {:>10}  {}",
            "Qty",
            "Product",
            "Price",
            "Id",
            width = self.title_width
        )));
        lines.push("─".repeat(self.title_width + 30));

        for item in items {
            lines.push(self.format_line(item));
        }

        let total: u64 = items.iter().map(|p| u64::from(p.quantity)).sum();
        lines.push(String::new());
        lines.push(format!(
            "{} ({} {})",
            self.bold(&format!("{total} {}", plural(total, "unit", "units"))),
            items.len(),
            plural(items.len() as u64, "product", "products"),
        ));

        lines.join("\n")
    }

    /// Formats one cart line.
    pub fn format_line(&self, item: &CartItem) -> String {
        format!(
            "{:>4}  {:<width$}  {:>10}  {}",
            item.quantity,
            truncate(&item.title, self.title_width),
            format!("{:.2}", item.price),
            self.cyan(&item.id),
            width = self.title_width
        )
    }

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            format!("{BOLD}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.use_colors {
            format!("{DIM}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn cyan(&self, text: &str) -> String {
        if self.use_colors {
            format!("{CYAN}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

fn plural<'a>(n: u64, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

/// Shortens `text` to `width` characters, ending in `…` when cut.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
