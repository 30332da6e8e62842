use chrono::Local;
use console::style;
use std::io::{self, Write};

use crate::app::{BackendStatus, Operation};
use crate::form::{Field, FormInput};
use crate::presenter::{AnalysisBlock, ValidationBlock, View};

const DEFAULT_BAR_WIDTH: usize = 30;

pub struct OutputHandler {
    debug: bool,
    bar_width: usize,
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputHandler {
    pub fn new() -> Self {
        Self {
            debug: false,
            bar_width: DEFAULT_BAR_WIDTH,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_bar_width(mut self, bar_width: usize) -> Self {
        self.bar_width = bar_width.max(1);
        self
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn print_error(&mut self, content: &str) -> io::Result<()> {
        println!("{} {}", style("Error:").red().bold(), content);
        Ok(())
    }

    pub fn print_system(&mut self, content: &str) -> io::Result<()> {
        println!("{}", style(content).yellow().dim());
        Ok(())
    }

    pub fn print_prompt(&mut self) -> io::Result<()> {
        print!("{} ", style("scalynx>").cyan().bold());
        io::stdout().flush()
    }

    pub fn print_settled(&mut self, operation: Operation) -> io::Result<()> {
        let stamp = Local::now().format("%H:%M:%S");
        println!("{}", style(format!("[{}] {} finished", stamp, operation)).dim());
        Ok(())
    }

    pub fn print_backend_status(&mut self, status: &BackendStatus) -> io::Result<()> {
        match status {
            BackendStatus::Unknown => println!("{}", style("Backend: not checked").dim()),
            BackendStatus::Online(message) => {
                println!("{} {}", style("Backend:").green().bold(), message)
            }
            BackendStatus::Offline => {
                println!("{} Failed to connect to backend", style("Backend:").red().bold())
            }
        }
        Ok(())
    }

    pub fn print_form(&mut self, input: &FormInput) -> io::Result<()> {
        for field in Field::ALL {
            let value = input.get(field);
            let shown = if value.is_empty() {
                style("(empty)".to_string()).dim()
            } else {
                style(value.to_string()).white()
            };
            println!("  {:<14} {}", style(format!("{}:", field.label())).cyan(), shown);
        }
        Ok(())
    }

    pub fn print_view(&mut self, view: &View) -> io::Result<()> {
        let rendered = self.render_view(view);
        if !rendered.is_empty() {
            println!("{}", rendered);
        }
        Ok(())
    }

    pub fn print_help(&mut self) -> io::Result<()> {
        let rows = [
            ("idea <text>", "Set the business idea"),
            ("market <text>", "Set the target market"),
            ("location <text>", "Set the location"),
            ("validate", "Submit the form for validation"),
            ("analyze", "Request a full analysis of the idea"),
            ("show", "Show the form and current results"),
            ("status", "Check that the backend is reachable"),
            ("help", "Show this help"),
            ("quit", "Exit"),
        ];
        for (command, about) in rows {
            println!("  {:<18} {}", style(command).green(), style(about).dim());
        }
        Ok(())
    }

    /// Renders the validation block, then the analysis block. Either may be
    /// absent; an empty view renders as an empty string.
    pub fn render_view(&self, view: &View) -> String {
        let mut lines = Vec::new();

        if view.validating {
            lines.push(style("Validating...").yellow().to_string());
        }
        match &view.validation {
            Some(ValidationBlock::Error(message)) => {
                lines.push(format!("{} {}", style("✗").red().bold(), style(message).red()));
            }
            Some(ValidationBlock::Confirmation(text)) => {
                lines.push(format!("{} {}", style("✓").green().bold(), style(text).green()));
            }
            None => {}
        }

        if view.analyzing {
            lines.push(style("Analyzing...").yellow().to_string());
        }
        if let Some(analysis) = &view.analysis {
            self.render_analysis(analysis, &mut lines);
        }

        lines.join("\n")
    }

    fn render_analysis(&self, analysis: &AnalysisBlock, lines: &mut Vec<String>) {
        lines.push(style("Strengths").green().bold().to_string());
        for item in &analysis.strengths {
            lines.push(format!("  + {}", item));
        }
        lines.push(style("Weaknesses").red().bold().to_string());
        for item in &analysis.weaknesses {
            lines.push(format!("  - {}", item));
        }
        lines.push(format!("{} {}", style("Rating:").cyan().bold(), analysis.rating));
        lines.push(format!(
            "{} {} {}",
            style("Success probability:").cyan().bold(),
            self.probability_bar(analysis.probability_width),
            analysis.probability_label
        ));
        lines.push(format!("{} {}", style("Advice:").cyan().bold(), analysis.advice));
    }

    /// Bar filled in proportion to `width_percent`.
    pub fn probability_bar(&self, width_percent: f64) -> String {
        let filled = ((width_percent.clamp(0.0, 100.0) / 100.0) * self.bar_width as f64).round() as usize;
        let filled = filled.min(self.bar_width);
        format!(
            "{}{}",
            style("█".repeat(filled)).green(),
            style("░".repeat(self.bar_width - filled)).dim()
        )
    }
}
