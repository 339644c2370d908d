//! Colours for the `bcf` command's report lines.

use owo_colors::{OwoColorize, Style, colors::css};

/// Whether stdout takes ANSI colours.
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

fn paint(text: &str, style: Style) -> String {
    if supports_color() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Styles for the parts of a build or validation report.
pub trait Colorize {
    /// A finished step, e.g. `Saved` (green).
    fn success(&self) -> String;
    /// A file the command wrote (blue).
    fn saved_path(&self) -> String;
    /// A content digest, secondary to the path (dimmed).
    fn digest(&self) -> String;
    /// Where in a topics file a problem is, e.g. `topics[1].title` (bold amber).
    fn location(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), Style::new().fg::<css::Green>())
    }

    fn saved_path(&self) -> String {
        paint(self.as_ref(), Style::new().fg::<css::LightBlue>())
    }

    fn digest(&self) -> String {
        paint(self.as_ref(), Style::new().dimmed())
    }

    fn location(&self) -> String {
        paint(self.as_ref(), Style::new().fg::<css::Orange>().bold())
    }
}
