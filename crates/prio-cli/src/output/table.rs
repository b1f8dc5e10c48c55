//! Aligned text tables for command rows.
//!
//! Each row type declares its columns through [`TableRow`] and hands back
//! typed [`Cell`]s. Scores and counts are right-aligned and never truncated;
//! titles and label lists give up width first on narrow terminals.

use prio_core::entities::Labels;
use prio_core::enums::{Bucket, DependencyLabel, ForecastTier, MoscowLabel, RiskLevel};

const GAP: &str = "  ";
const MIN_FLEX_WIDTH: usize = 8;

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Traffic-light hint for a label value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Good,
    Warn,
    Bad,
    Plain,
}

impl Tone {
    const fn ansi(self) -> Option<&'static str> {
        match self {
            Self::Good => Some("32"),
            Self::Warn => Some("33"),
            Self::Bad => Some("31"),
            Self::Plain => None,
        }
    }

    fn paint(self, text: &str) -> String {
        match self.ansi() {
            Some(code) => format!("\u{1b}[{code}m{text}\u{1b}[0m"),
            None => text.to_string(),
        }
    }

    /// Tone of a stored label, keyed by the label family.
    #[must_use]
    pub fn for_label(key: &str, value: &str) -> Self {
        if key == "MOSCOW" {
            return MoscowLabel::parse_lenient(value).map_or(Self::Plain, Self::from);
        }
        if key.ends_with("_BIN") {
            return match value {
                "HIGH" => Bucket::High.into(),
                "MEDIUM" => Bucket::Medium.into(),
                "LOW" => Bucket::Low.into(),
                _ => Self::Plain,
            };
        }
        match value {
            "aligned" => Self::Good,
            "misaligned" => Self::Bad,
            _ => Self::Plain,
        }
    }
}

impl From<Bucket> for Tone {
    fn from(bucket: Bucket) -> Self {
        match bucket {
            Bucket::High => Self::Good,
            Bucket::Medium => Self::Warn,
            Bucket::Low => Self::Plain,
        }
    }
}

impl From<MoscowLabel> for Tone {
    fn from(label: MoscowLabel) -> Self {
        match label {
            MoscowLabel::Must => Self::Good,
            MoscowLabel::Should | MoscowLabel::Could => Self::Warn,
            MoscowLabel::Wont => Self::Bad,
        }
    }
}

impl From<RiskLevel> for Tone {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => Self::Good,
            RiskLevel::Medium => Self::Warn,
            RiskLevel::High | RiskLevel::Critical => Self::Bad,
        }
    }
}

impl From<DependencyLabel> for Tone {
    fn from(label: DependencyLabel) -> Self {
        match label {
            DependencyLabel::Simple => Self::Good,
            DependencyLabel::Complex => Self::Warn,
            DependencyLabel::Cycle => Self::Bad,
        }
    }
}

impl From<ForecastTier> for Tone {
    fn from(tier: ForecastTier) -> Self {
        match tier {
            ForecastTier::Pert => Self::Good,
            ForecastTier::History => Self::Plain,
            ForecastTier::Fallback => Self::Warn,
        }
    }
}

/// One table cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// Identifier or method name; kept whole.
    Key(String),
    /// Free text; shrinks on narrow terminals.
    Text(String),
    /// Score or effort, four decimals; `-` when absent.
    Number(Option<f64>),
    Count(usize),
    /// A single label value such as a risk level.
    Level(String, Tone),
    /// `KEY=value` pairs; shrinks on narrow terminals.
    Labels(Vec<(String, String, Tone)>),
}

impl Cell {
    pub fn level(value: &str, tone: impl Into<Tone>) -> Self {
        Self::Level(value.to_string(), tone.into())
    }

    #[must_use]
    pub fn labels(labels: &Labels) -> Self {
        Self::Labels(
            labels
                .iter()
                .map(|(key, value)| (key.clone(), value.clone(), Tone::for_label(key, value)))
                .collect(),
        )
    }

    fn plain(&self) -> String {
        match self {
            Self::Key(text) | Self::Text(text) | Self::Level(text, _) => text.clone(),
            Self::Number(Some(value)) => format!("{value:.4}"),
            Self::Number(None) => "-".to_string(),
            Self::Count(count) => count.to_string(),
            Self::Labels(pairs) if pairs.is_empty() => "-".to_string(),
            Self::Labels(pairs) => pairs
                .iter()
                .map(|(key, value, _)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    fn painted(&self) -> String {
        match self {
            Self::Level(text, tone) => tone.paint(text),
            Self::Labels(pairs) if !pairs.is_empty() => pairs
                .iter()
                .map(|(key, value, tone)| format!("{key}={}", tone.paint(value)))
                .collect::<Vec<_>>()
                .join(" "),
            other => other.plain(),
        }
    }

    const fn right_aligned(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Count(_))
    }

    const fn flexible(&self) -> bool {
        matches!(self, Self::Text(_) | Self::Labels(_))
    }
}

/// A row type that knows its own columns.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    /// One cell per header, in header order.
    fn cells(&self) -> Vec<Cell>;
}

/// Render rows under their declared headers.
#[must_use]
pub fn render_rows<R: TableRow>(rows: &[R], options: TableOptions) -> String {
    if rows.is_empty() {
        return String::from("(no rows)");
    }
    let cells: Vec<Vec<Cell>> = rows.iter().map(TableRow::cells).collect();
    render_cells(R::HEADERS, &cells, options)
}

/// Render pre-built cells under `headers`.
#[must_use]
pub fn render_cells(headers: &[&str], rows: &[Vec<Cell>], options: TableOptions) -> String {
    let plain: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(Cell::plain).collect())
        .collect();

    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            plain
                .iter()
                .filter_map(|row| row.get(col))
                .map(|text| text.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let flexible: Vec<bool> = (0..headers.len())
        .map(|col| {
            rows.iter()
                .all(|row| row.get(col).is_some_and(Cell::flexible))
        })
        .collect();
    if let Some(max_width) = options.max_width {
        shrink_to_fit(&mut widths, &flexible, headers, max_width);
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| {
            let clipped = clip(header, *width);
            pad(&clipped, clipped.chars().count(), *width, false)
        })
        .collect::<Vec<_>>()
        .join(GAP);
    let rule = widths.iter().sum::<usize>() + GAP.len() * widths.len().saturating_sub(1);
    lines.push(header_line.trim_end().to_string());
    lines.push("-".repeat(rule));

    for (row, texts) in rows.iter().zip(&plain) {
        let line = row
            .iter()
            .zip(texts)
            .zip(&widths)
            .map(|((cell, text), width)| {
                let clipped = clip(text, *width);
                let visible = clipped.chars().count();
                let shown = if options.color && clipped == *text {
                    cell.painted()
                } else {
                    clipped
                };
                pad(&shown, visible, *width, cell.right_aligned())
            })
            .collect::<Vec<_>>()
            .join(GAP);
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

/// Narrow the widest flexible column until the row fits `max_width`.
fn shrink_to_fit(widths: &mut [usize], flexible: &[bool], headers: &[&str], max_width: usize) {
    let gaps = GAP.len() * widths.len().saturating_sub(1);
    while widths.iter().sum::<usize>() + gaps > max_width {
        let candidate = widths
            .iter()
            .enumerate()
            .filter(|(col, width)| {
                flexible[*col] && **width > headers[*col].chars().count().max(MIN_FLEX_WIDTH)
            })
            .max_by_key(|(_, width)| **width)
            .map(|(col, _)| col);
        let Some(col) = candidate else {
            break;
        };
        widths[col] -= 1;
    }
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(shown: &str, visible: usize, width: usize, right: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(visible));
    if right {
        format!("{fill}{shown}")
    } else {
        format!("{shown}{fill}")
    }
}
