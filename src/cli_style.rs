use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Attribute, Color as CtColor, Stylize};
use unicode_width::UnicodeWidthStr;

fn ansi(color: AnsiColor) -> Style {
    Style::new().bold().fg_color(Some(Color::Ansi(color)))
}

pub fn get_styles() -> Styles {
    Styles::styled()
        .usage(ansi(AnsiColor::Cyan).underline())
        .header(ansi(AnsiColor::Cyan).underline())
        .literal(ansi(AnsiColor::Green))
        .invalid(ansi(AnsiColor::Red))
        .error(ansi(AnsiColor::Red))
        .valid(ansi(AnsiColor::Green))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

mod palette {
    use crossterm::style::Color;

    const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color::Rgb { r, g, b }
    }

    pub const FRAME: Color = rgb(0, 255, 255);
    pub const ACCENT: Color = rgb(180, 100, 255);
    pub const HIGHLIGHT: Color = rgb(255, 0, 255);
    pub const GOOD: Color = rgb(0, 255, 136);
    pub const WARN: Color = rgb(255, 165, 0);
    pub const BAD: Color = rgb(255, 85, 85);
    pub const INFO: Color = rgb(100, 149, 237);
    pub const MUTED: Color = rgb(128, 128, 128);
    pub const TEXT: Color = rgb(255, 255, 255);
}

/// Width of section frames, in columns.
const SECTION_WIDTH: usize = 60;

// ═══════════════════════════════════════════════════════════════════════════════
// Notices
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    Success,
    Error,
    Warning,
    Info,
}

impl Notice {
    fn glyph_and_color(self) -> (&'static str, CtColor) {
        match self {
            Notice::Success => ("✓", palette::GOOD),
            Notice::Error => ("✗", palette::BAD),
            Notice::Warning => ("⚠", palette::WARN),
            Notice::Info => ("ℹ", palette::INFO),
        }
    }

    pub fn print(self, message: &str) {
        let (glyph, color) = self.glyph_and_color();
        println!(" {} {}", glyph.with(color).bold(), message.with(color));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Sections
// ═══════════════════════════════════════════════════════════════════════════════

/// Top frame with a centered title.
pub fn print_heading(title: &str) {
    let left = SECTION_WIDTH.saturating_sub(title.width() + 4) / 2;
    let right = SECTION_WIDTH.saturating_sub(title.width() + 4 + left);
    println!();
    println!(
        "{}{} {} {}{}",
        "╭".with(palette::FRAME),
        "─".repeat(left).with(palette::FRAME),
        title.with(palette::FRAME).bold().attribute(Attribute::Italic),
        "─".repeat(right).with(palette::FRAME),
        "╮".with(palette::FRAME)
    );
}

/// A framed block of `key: value` lines. The bottom frame is printed by
/// [`Section::close`].
pub struct Section;

impl Section {
    pub fn open(title: &str) -> Section {
        print_heading(title);
        Section
    }

    pub fn field(&self, key: &str, value: impl std::fmt::Display) -> &Self {
        println!(
            "  {} {} {}",
            "●".with(palette::ACCENT),
            format!("{}:", key).with(palette::MUTED),
            value.to_string().with(palette::TEXT)
        );
        self
    }

    /// A field drawn in the highlight colors, for the headline figure.
    pub fn headline(&self, key: &str, value: impl std::fmt::Display) -> &Self {
        println!(
            "  {} {} {}",
            "◆".with(palette::HIGHLIGHT),
            format!("{}:", key).with(palette::FRAME).bold(),
            value.to_string().with(palette::GOOD).bold()
        );
        self
    }

    pub fn close(&self) {
        println!(
            "{}{}{}",
            "╰".with(palette::FRAME),
            "─".repeat(SECTION_WIDTH - 2).with(palette::FRAME),
            "╯".with(palette::FRAME)
        );
        println!();
    }
}

pub fn print_line(item: &str) {
    println!("  {}  {}", "▶".with(palette::FRAME), item.with(palette::TEXT));
}

pub fn print_empty(message: &str) {
    println!(
        "  {} {}",
        "○".with(palette::MUTED),
        message.with(palette::MUTED).attribute(Attribute::Italic)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tables
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A column of a [`Table`]: its header and how its cells are aligned.
pub struct ColumnSpec {
    header: String,
    align: Align,
}

impl ColumnSpec {
    pub fn text(header: &str) -> Self {
        ColumnSpec {
            header: header.to_string(),
            align: Align::Left,
        }
    }

    pub fn number(header: &str) -> Self {
        ColumnSpec {
            header: header.to_string(),
            align: Align::Right,
        }
    }
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(cell.width()));
    match align {
        Align::Left => format!("{}{}", cell, fill),
        Align::Right => format!("{}{}", fill, cell),
    }
}

/// Rows of formatted cells under a header line. Missing cells render empty,
/// extra cells are dropped.
pub struct Table {
    columns: Vec<ColumnSpec>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) -> &mut Self {
        self.rows.push(cells);
        self
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.width())
                    .fold(column.header.width(), usize::max)
            })
            .collect()
    }

    fn rule(widths: &[usize], left: &str, mid: &str, right: &str) -> String {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(mid), right)
    }

    fn line(&self, widths: &[usize], cells: &[String]) -> String {
        let padded: Vec<String> = self
            .columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (column, &width))| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!(" {} ", pad(cell, width, column.align))
            })
            .collect();
        format!("│{}│", padded.join("│"))
    }

    /// Plain text lines of the table, frame included.
    pub fn render(&self) -> Vec<String> {
        let widths = self.widths();
        let headers: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        let mut lines = vec![
            Self::rule(&widths, "╭", "┬", "╮"),
            self.line(&widths, &headers),
            Self::rule(&widths, "├", "┼", "┤"),
        ];
        lines.extend(self.rows.iter().map(|row| self.line(&widths, row)));
        lines.push(Self::rule(&widths, "╰", "┴", "╯"));
        lines
    }

    pub fn print(&self) {
        for (i, line) in self.render().into_iter().enumerate() {
            match i {
                1 => println!("{}", line.with(palette::FRAME).bold()),
                _ if line.starts_with('│') => println!("{}", line.with(palette::TEXT)),
                _ => println!("{}", line.with(palette::FRAME)),
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Prompt, welcome and help
// ═══════════════════════════════════════════════════════════════════════════════

fn chevrons() -> String {
    format!(
        "{}{}{}",
        "❯".with(palette::FRAME).bold(),
        "❯".with(palette::ACCENT).bold(),
        "❯".with(palette::HIGHLIGHT).bold(),
    )
}

pub fn get_prompt() -> String {
    format!("{} ", chevrons())
}

pub fn print_command_echo(command: &str) {
    println!("{}  {}", chevrons(), command.with(palette::GOOD).bold());
}

const BANNER: [&str; 2] = [
    "    ▀█▀ █▀█ ▄▀█ █▀▀ █▄▀ █▀ ▀█▀ ▄▀█ ▀█▀ █▀",
    "     █  █▀▄ █▀█ █▄▄ █ █ ▄█  █  █▀█  █  ▄█",
];

/// Banner plus a box with the dataset path and row counts.
pub fn print_welcome(db_path: &str, artists: usize, tracks: usize) {
    println!();
    for (line, color) in BANNER.iter().zip([palette::FRAME, palette::ACCENT]) {
        println!("{}", line.with(color).bold());
    }
    println!(
        "{}",
        "  ═══════════════  TRACK POPULARITY DASHBOARD  ═══════════════".with(palette::MUTED)
    );
    println!();

    let box_width = 64;
    let framed = |text: String, visible: usize| {
        println!(
            "  {}{}{}{}",
            "║".with(palette::ACCENT),
            text,
            " ".repeat(box_width - visible.min(box_width)),
            "║".with(palette::ACCENT)
        );
    };
    let plain = |text: &str, color: CtColor| {
        framed(format!("  {}", text.with(color)), text.width() + 2);
    };

    println!("  {}", format!("╔{}╗", "═".repeat(box_width)).with(palette::ACCENT));
    plain("Connected to tracks dataset", palette::GOOD);
    plain("", palette::TEXT);
    for (key, value) in [
        ("Dataset", db_path.to_string()),
        ("Artists", artists.to_string()),
        ("Tracks", tracks.to_string()),
    ] {
        let visible = key.width() + value.width() + 4;
        framed(
            format!("  {} {}", format!("{}:", key).with(palette::MUTED), value),
            visible,
        );
    }
    plain("", palette::TEXT);
    plain("Type 'help' for available commands", palette::MUTED);
    println!("  {}", format!("╚{}╝", "═".repeat(box_width)).with(palette::ACCENT));
    println!();
}

pub struct CommandHelp {
    pub name: String,
    pub args: String,
    pub description: String,
}

/// Commands under a shared heading in the help screen.
pub struct CommandGroup {
    pub title: &'static str,
    pub commands: Vec<CommandHelp>,
}

pub fn print_help(groups: &[CommandGroup]) {
    let section = Section::open("Available Commands");
    println!();
    let colors = [palette::FRAME, palette::ACCENT, palette::HIGHLIGHT, palette::WARN];
    for (group, color) in groups.iter().zip(colors.iter().cycle()) {
        println!("  {} {}", "◆".with(*color), group.title.with(*color).bold());
        for cmd in &group.commands {
            println!(
                "      {} {}  {}",
                cmd.name.as_str().with(palette::GOOD).bold(),
                cmd.args.as_str().with(palette::MUTED),
                cmd.description.as_str().with(palette::TEXT)
            );
        }
        println!();
    }
    section.close();
}

pub fn print_goodbye() {
    println!();
    println!("  {} {}", "★".with(palette::FRAME), "Goodbye!".with(palette::ACCENT).bold());
    println!();
}
