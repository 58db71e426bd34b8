//! Text rendering of the view models.
//!
//! One `Painter` drives both the interactive terminal (ANSI color, block
//! glyphs) and the export path (plain ASCII).

use std::fmt::Write as _;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::views::landing::LandingView;
use crate::views::loading::{LoadingView, StageState};
use crate::views::report::{correlation_legend, BarChart, ReportView, ScatterPanel};
use crate::views::upload::{UploadView, TIPS};
use crate::views::Tone;

const MAX_LABEL: usize = 24;
const SCATTER_W: usize = 48;
const SCATTER_H: usize = 14;

#[derive(Debug, Clone, Copy)]
pub struct Painter {
    pub color: bool,
    pub ascii: bool,
    pub width: usize,
}

impl Default for Painter {
    fn default() -> Self {
        Self {
            color: false,
            ascii: false,
            width: 80,
        }
    }
}

impl Painter {
    pub fn terminal(color: bool) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Plain ASCII output, used for export.
    pub fn plain(width: usize) -> Self {
        Self {
            color: false,
            ascii: true,
            width,
        }
    }

    fn paint(&self, tone: Tone, text: &str) -> String {
        if self.color {
            format!("\x1b[38;5;{}m{}\x1b[0m", tone.ansi(), text)
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            format!("\x1b[1m{}\x1b[0m", text)
        } else {
            text.to_string()
        }
    }

    fn bar_glyph(&self) -> char {
        if self.ascii {
            '#'
        } else {
            '█'
        }
    }

    fn rule(&self) -> String {
        let ch = if self.ascii { '-' } else { '─' };
        std::iter::repeat(ch).take(self.width).collect()
    }

    fn heading(&self, out: &mut String, title: &str) {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.bold(title));
        let _ = writeln!(out, "{}", self.rule());
    }

    // =========================================================================
    // Screens
    // =========================================================================

    pub fn landing(&self, view: &LandingView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.bold(view.title));
        let _ = writeln!(out, "{}", view.tagline);
        let _ = writeln!(out);
        for line in wrap(view.pitch, self.width) {
            let _ = writeln!(out, "{}", line);
        }
        let _ = writeln!(out);
        for (text, tone) in view.highlights.iter() {
            let _ = writeln!(out, "  {} {}", self.paint(*tone, "*"), text);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "[ {} ]", view.call_to_action);
        out
    }

    pub fn upload(&self, view: &UploadView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.bold("Upload Your Data"));
        let _ = writeln!(out, "Upload three CSV files to begin the autopsy analysis");
        let _ = writeln!(out);
        for picker in &view.pickers {
            let status = match &picker.chosen {
                Some(name) => self.paint(Tone::Green, &format!("[x] {}", name)),
                None => self.paint(Tone::Gray, "[ ] click to upload"),
            };
            let _ = writeln!(
                out,
                "  {:<18} {:<9} {}",
                picker.label,
                picker.slot.field(),
                status
            );
            let _ = writeln!(out, "  {:<18} {}", "", picker.description);
        }
        if let Some(err) = &view.error {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", self.paint(Tone::Red, &format!("! {}", err)));
        }
        let _ = writeln!(out);
        let button = if view.can_submit {
            self.bold("[ Run Autopsy Analysis ]")
        } else {
            self.paint(Tone::Gray, "[ Run Autopsy Analysis ] (select all three files)")
        };
        let _ = writeln!(out, "{}", button);
        let _ = writeln!(out);
        let _ = writeln!(out, "Quick Tips");
        for tip in TIPS.iter() {
            let _ = writeln!(out, "  - {}", tip);
        }
        out
    }

    /// One-line loading indicator suitable for `\r` redraws.
    pub fn loading_line(&self, view: &LoadingView) -> String {
        let (text, _) = view
            .stages()
            .find(|(_, s)| *s == StageState::Active)
            .unwrap_or(("Running autopsy analysis...", StageState::Active));
        format!(
            "{} Running Autopsy Analysis [{}/{}] {}",
            view.spinner(),
            view.active_stage() + 1,
            crate::views::loading::STAGES.len(),
            text
        )
    }

    pub fn loading(&self, view: &LoadingView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.bold("Running Autopsy Analysis"));
        let _ = writeln!(out, "Diagnosing your model failure...");
        for (text, state) in view.stages() {
            let line = match state {
                StageState::Done => self.paint(Tone::Green, &format!("  [done] {}", text)),
                StageState::Active => self.paint(Tone::Purple, &format!("  [{}]    {}", view.spinner(), text)),
                StageState::Pending => self.paint(Tone::Gray, &format!("  [    ] {}", text)),
            };
            let _ = writeln!(out, "{}", line);
        }
        out
    }

    pub fn report(&self, view: &ReportView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.bold(crate::views::report::TITLE));
        if let Some(ts) = &view.generated_at {
            let _ = writeln!(out, "Generated {}", ts);
        }
        let _ = writeln!(out);
        for line in wrap(&view.summary, self.width) {
            let _ = writeln!(out, "{}", line);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Severity: {}", self.paint(view.severity_tone, &format!("[ {} ]", view.severity)));

        self.heading(&mut out, "Summary");
        for card in &view.stat_cards {
            let value = match card.total {
                Some(total) => format!("{} / {}", card.value, total),
                None => card.value.to_string(),
            };
            let _ = writeln!(out, "  {:<20} {}", card.label, self.paint(card.tone, &value));
        }

        self.bar_chart(&mut out, &view.drift_chart);
        self.bar_chart(&mut out, &view.impact_chart);
        self.scatter(&mut out, &view.correlation);

        if !view.critical_features.is_empty() {
            self.heading(&mut out, "Critical Features Identified");
            let _ = writeln!(
                out,
                "These features exhibit both significant drift AND high impact on predictions"
            );
            let chips: Vec<String> = view
                .critical_features
                .iter()
                .map(|f| self.paint(Tone::Red, &format!("({})", f)))
                .collect();
            let _ = writeln!(out, "  {}", chips.join(" "));
        }

        self.heading(&mut out, "AI-Powered Diagnosis");
        let _ = writeln!(out, "{}", self.bold("Root Cause Analysis"));
        self.block(&mut out, &view.diagnosis.root_cause);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.bold("Business Impact"));
        self.block(&mut out, &view.diagnosis.business_impact);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.bold("Complete Diagnosis"));
        self.block(&mut out, &view.diagnosis.full);

        if !view.recommendations.is_empty() {
            self.heading(&mut out, "Recommended Actions");
            for (i, rec) in view.recommendations.iter().enumerate() {
                let prefix = format!("{:>3}. ", i + 1);
                let indent = " ".repeat(prefix.len());
                for (j, line) in wrap(rec, self.width.saturating_sub(prefix.len())).into_iter().enumerate() {
                    let lead = if j == 0 { prefix.as_str() } else { indent.as_str() };
                    let _ = writeln!(out, "{}{}", lead, line);
                }
            }
        }
        out
    }

    // =========================================================================
    // Widgets
    // =========================================================================

    fn block(&self, out: &mut String, text: &str) {
        if text.trim().is_empty() {
            let _ = writeln!(out, "  (not provided)");
            return;
        }
        for raw in text.lines() {
            if raw.trim().is_empty() {
                let _ = writeln!(out);
                continue;
            }
            for line in wrap(raw, self.width.saturating_sub(2)) {
                let _ = writeln!(out, "  {}", line);
            }
        }
    }

    fn bar_chart(&self, out: &mut String, chart: &BarChart) {
        self.heading(out, chart.title);
        if chart.bars.is_empty() {
            let _ = writeln!(out, "  (no data)");
            return;
        }
        let label_w = chart
            .bars
            .iter()
            .map(|b| b.label.width())
            .max()
            .unwrap_or(0)
            .min(MAX_LABEL);
        let max = chart.bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
        // label, two spaces, bar, space, value (8), space, class (10)
        let bar_w = self.width.saturating_sub(label_w + 2 + 1 + 8 + 1 + 10).max(10);
        for bar in &chart.bars {
            let len = if max > 0.0 {
                ((bar.value / max) * bar_w as f64).round() as usize
            } else {
                0
            };
            let glyphs: String = std::iter::repeat(self.bar_glyph()).take(len.max(1)).collect();
            let padded = pad(&truncate(&bar.label, label_w), label_w);
            let _ = writeln!(
                out,
                "  {} {}{} {:>8.4} {}",
                padded,
                self.paint(bar.tone, &glyphs),
                " ".repeat(bar_w - len.max(1).min(bar_w)),
                bar.value,
                bar.class
            );
        }
        let legend: Vec<String> = chart
            .legend
            .iter()
            .map(|(name, tone)| format!("{} {}", self.paint(*tone, "*"), name))
            .collect();
        let _ = writeln!(out, "  {}", legend.join("   "));
    }

    fn scatter(&self, out: &mut String, panel: &ScatterPanel) {
        self.heading(out, panel.title);
        let _ = writeln!(out, "{}", panel.subtitle);
        if panel.points.is_empty() {
            let _ = writeln!(out, "  (no data)");
            return;
        }
        let max_x = panel.points.iter().map(|p| p.drift).fold(0.0_f64, f64::max).max(1e-9);
        let max_y = panel.points.iter().map(|p| p.impact).fold(0.0_f64, f64::max).max(1e-9);

        let mut grid = vec![vec![None::<Tone>; SCATTER_W]; SCATTER_H];
        for p in &panel.points {
            let col = ((p.drift.max(0.0) / max_x) * (SCATTER_W - 1) as f64).round() as usize;
            let row = ((p.impact.max(0.0) / max_y) * (SCATTER_H - 1) as f64).round() as usize;
            let cell = &mut grid[SCATTER_H - 1 - row.min(SCATTER_H - 1)][col.min(SCATTER_W - 1)];
            // critical points win collisions
            if cell.is_none() || p.critical {
                *cell = Some(p.tone);
            }
        }

        let _ = writeln!(out, "  impact {:.4}", max_y);
        for row in &grid {
            let mut line = String::from("  |");
            for cell in row {
                match cell {
                    Some(Tone::Red) => line.push_str(&self.paint(Tone::Red, "X")),
                    Some(tone) => line.push_str(&self.paint(*tone, "o")),
                    None => line.push(' '),
                }
            }
            let _ = writeln!(out, "{}", line);
        }
        let _ = writeln!(out, "  +{}", "-".repeat(SCATTER_W));
        let _ = writeln!(out, "   0{:>w$}", format!("drift {:.4}", max_x), w = SCATTER_W - 1);

        let legend: Vec<String> = correlation_legend()
            .iter()
            .map(|(name, tone)| {
                let mark = if *tone == Tone::Red { "X" } else { "o" };
                format!("{} {}", self.paint(*tone, mark), name)
            })
            .collect();
        let _ = writeln!(out, "  {}", legend.join("   "));
        for p in &panel.points {
            let mark = if p.critical { "X" } else { "o" };
            let _ = writeln!(
                out,
                "  {} {} drift {:.4}  impact {:.4}",
                self.paint(p.tone, mark),
                pad(&truncate(&p.feature, MAX_LABEL), MAX_LABEL),
                p.drift,
                p.impact
            );
        }
    }
}

fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Cut `text` to at most `max` terminal cells, marking the cut with `~`.
fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = char_width(ch);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('~');
    out
}

/// Left-align `text` in a column `width` cells wide.
fn pad(text: &str, width: usize) -> String {
    let mut out = text.to_string();
    out.push_str(&" ".repeat(width.saturating_sub(text.width())));
    out
}

/// Split a word wider than `width` cells into pieces that fit.
fn break_word(word: &str, width: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for ch in word.chars() {
        let w = char_width(ch);
        if used + w > width && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(ch);
        used += w;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Greedy word wrap measured in terminal cells. Words wider than `width`
/// are broken across lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(10);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for word in text.split_whitespace() {
        for piece in break_word(word, width) {
            let w = piece.width();
            let needed = if current.is_empty() { w } else { used + 1 + w };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                used = 0;
            }
            if !current.is_empty() {
                current.push(' ');
                used += 1;
            }
            current.push_str(&piece);
            used += w;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
