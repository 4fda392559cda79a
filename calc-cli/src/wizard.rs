//! Line-oriented front end for [`ProjectCalculator`].
//!
//! Every step reads plain lines. Three commands work at any prompt:
//! `:b` goes back one step, `:r` starts over and `:q` quits. End of input
//! also quits; the state is already persisted by the calculator, so the
//! next run resumes where this one stopped.

use std::io::{BufRead, Write};

use anyhow::Result;
use calc_core::calculator::pricing::format_price;
use calc_core::{CalculatorError, ContactUpdate, LeadRecord, ProjectCalculator, Step};
use tracing::debug;

pub const SUBMIT_FAILED: &str = "Submission failed, please retry or contact us directly.";

/// How a wizard session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Submitted(LeadRecord),
    Quit,
}

enum Flow {
    Continue,
    Quit,
    Submitted(LeadRecord),
}

enum Input {
    Line(String),
    Handled(Flow),
}

/// Reads a line, or returns from the enclosing step when the line was a
/// command or input ended.
macro_rules! read_line {
    ($wizard:expr, $prompt:expr) => {
        match $wizard.read($prompt)? {
            Input::Line(line) => line,
            Input::Handled(flow) => return Ok(flow),
        }
    };
}

pub struct Wizard<R, W> {
    calculator: ProjectCalculator,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Wizard<R, W> {
    pub fn new(
        calculator: ProjectCalculator,
        input: R,
        output: W,
    ) -> Self {
        Self {
            calculator,
            input,
            output,
        }
    }

    pub fn calculator(&self) -> &ProjectCalculator {
        &self.calculator
    }

    pub fn into_parts(self) -> (ProjectCalculator, W) {
        (self.calculator, self.output)
    }

    pub async fn run(&mut self) -> Result<Outcome> {
        loop {
            self.render_progress()?;
            let flow = match self.calculator.current_step() {
                Step::Welcome => self.welcome()?,
                Step::ProjectType => self.project_type()?,
                Step::Addons => self.addons()?,
                Step::Notes => self.notes()?,
                Step::Summary => self.summary().await?,
            };

            match flow {
                Flow::Continue => {}
                Flow::Quit => {
                    writeln!(self.output, "Bye. Your progress has been saved.")?;
                    return Ok(Outcome::Quit);
                }
                Flow::Submitted(lead) => return Ok(Outcome::Submitted(lead)),
            }
        }
    }

    fn read(
        &mut self,
        prompt: &str,
    ) -> Result<Input> {
        write!(self.output, "{prompt} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(Input::Handled(Flow::Quit));
        }
        let line = line.trim().to_string();

        let flow = match line.as_str() {
            ":q" => Some(Flow::Quit),
            ":b" => {
                if let Err(error) = self.calculator.retreat() {
                    writeln!(self.output, "{}", capitalize(&error.to_string()))?;
                }
                Some(Flow::Continue)
            }
            ":r" => {
                self.calculator.reset();
                writeln!(self.output, "Calculator reset.")?;
                Some(Flow::Continue)
            }
            _ => None,
        };

        match flow {
            Some(flow) => {
                debug!(command = %line, "wizard command");
                Ok(Input::Handled(flow))
            }
            None => Ok(Input::Line(line)),
        }
    }

    fn render_progress(&mut self) -> Result<()> {
        let trail = self
            .calculator
            .steps()
            .iter()
            .map(|status| {
                let mark = if status.is_active {
                    "●"
                } else if status.is_completed {
                    "✔"
                } else {
                    "○"
                };
                format!("{mark} {}", status.step)
            })
            .collect::<Vec<_>>()
            .join("  ");

        writeln!(self.output)?;
        writeln!(self.output, "{trail}  [{}%]", self.calculator.progress())?;
        writeln!(self.output)?;
        Ok(())
    }

    fn welcome(&mut self) -> Result<Flow> {
        writeln!(self.output, "Project cost calculator")?;
        writeln!(
            self.output,
            "Answer a few questions to get an estimate, then send it to us."
        )?;
        writeln!(self.output, "Commands: :b back, :r start over, :q quit.")?;
        read_line!(self, "Press Enter to start.");

        self.calculator.advance()?;
        Ok(Flow::Continue)
    }

    fn project_type(&mut self) -> Result<Flow> {
        let catalog = self.calculator.catalog();
        let selected = self.calculator.state().selected_project_type();
        let types = catalog.project_types();

        writeln!(self.output, "Choose a project type:")?;
        for (number, project_type) in types.iter().enumerate() {
            let Some(info) = catalog.project_type_info(*project_type) else {
                continue;
            };
            let marker = if selected == Some(*project_type) { "*" } else { " " };
            writeln!(
                self.output,
                "{marker}{:>2}. {}  {}",
                number + 1,
                info.name,
                format_price(info.base_price)
            )?;
            writeln!(self.output, "     {}", info.description)?;
            if !info.features.is_empty() {
                writeln!(self.output, "     {}", info.features.join(" · "))?;
            }
        }

        let line = read_line!(self, "Number (Enter to continue):");
        if !line.is_empty() {
            let chosen = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|index| types.get(index).copied());
            match chosen {
                Some(project_type) => self.calculator.set_project_type(project_type),
                None => {
                    writeln!(self.output, "Unknown option '{line}'.")?;
                    return Ok(Flow::Continue);
                }
            }
        }

        match self.calculator.advance() {
            Ok(_) => {}
            Err(CalculatorError::MissingProjectType) => {
                writeln!(self.output, "Please choose a project type first.")?;
            }
            Err(other) => return Err(other.into()),
        }
        Ok(Flow::Continue)
    }

    fn addons(&mut self) -> Result<Flow> {
        let addons = self.calculator.available_addons().to_vec();

        if addons.is_empty() {
            writeln!(self.output, "No add-ons available for this project type.")?;
        } else {
            writeln!(self.output, "Add-ons (type a number to toggle):")?;
            for (number, addon) in addons.iter().enumerate() {
                let mark = if self.calculator.is_addon_selected(addon) {
                    "[x]"
                } else {
                    "[ ]"
                };
                writeln!(
                    self.output,
                    "{mark} {:>2}. {}  +{}",
                    number + 1,
                    addon.label,
                    format_price(addon.price)
                )?;
                if !addon.description.is_empty() {
                    writeln!(self.output, "        {}", addon.description)?;
                }
            }
        }
        writeln!(
            self.output,
            "Total: {}",
            format_price(self.calculator.state().total_cost())
        )?;

        let line = read_line!(self, "Number (Enter to continue):");
        if line.is_empty() {
            self.calculator.advance()?;
            return Ok(Flow::Continue);
        }

        let chosen = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| addons.get(index));
        match chosen {
            Some(addon) => self.calculator.toggle_addon(addon),
            None => writeln!(self.output, "Unknown option '{line}'.")?,
        }
        Ok(Flow::Continue)
    }

    fn notes(&mut self) -> Result<Flow> {
        let current = self.calculator.state().notes().to_string();
        writeln!(self.output, "Anything we should know? (up to 1000 characters)")?;
        if !current.is_empty() {
            writeln!(self.output, "Current: {current}")?;
            writeln!(self.output, "Enter keeps it, '-' clears it.")?;
        }

        let line = read_line!(self, "Notes:");
        match line.as_str() {
            "" => {}
            "-" => self.calculator.set_notes(""),
            _ => self.calculator.set_notes(line),
        }

        self.calculator.advance()?;
        Ok(Flow::Continue)
    }

    async fn summary(&mut self) -> Result<Flow> {
        self.render_summary()?;

        let contact = self.calculator.state().contact_data().clone();
        writeln!(self.output)?;
        writeln!(self.output, "Contact details (Enter keeps the value in brackets):")?;
        let first_name = read_line!(self, &field_prompt("First name", &contact.first_name));
        let email = read_line!(self, &field_prompt("Email", &contact.email));
        let phone = read_line!(self, &field_prompt("Phone", &contact.phone));
        let current_consent = if contact.gdpr_consent { "y" } else { "n" };
        let consent = read_line!(
            self,
            &field_prompt(
                "I agree to the processing of my personal data (y/n)",
                current_consent
            )
        );

        self.calculator.update_contact(ContactUpdate {
            first_name: non_empty(first_name),
            email: non_empty(email),
            phone: non_empty(phone),
            gdpr_consent: parse_yes_no(&consent),
        });

        if let Err(CalculatorError::InvalidContact(errors)) = self.calculator.advance() {
            for error in errors {
                writeln!(self.output, "  ! {}", capitalize(&error.to_string()))?;
            }
            return Ok(Flow::Continue);
        }

        let answer = read_line!(self, "Send the estimate? (y/n)");
        if parse_yes_no(&answer) != Some(true) {
            return Ok(Flow::Continue);
        }

        match self.calculator.submit_lead().await {
            Ok(lead) => {
                writeln!(
                    self.output,
                    "Thank you! We will contact you shortly about your {} estimate.",
                    format_price(lead.total_cost)
                )?;
                Ok(Flow::Submitted(lead))
            }
            Err(CalculatorError::Sink(_)) => {
                writeln!(self.output, "{SUBMIT_FAILED}")?;
                Ok(Flow::Continue)
            }
            Err(other) => {
                writeln!(self.output, "{}", capitalize(&other.to_string()))?;
                Ok(Flow::Continue)
            }
        }
    }

    fn render_summary(&mut self) -> Result<()> {
        let state = self.calculator.state();
        let catalog = self.calculator.catalog();

        writeln!(self.output, "Summary")?;
        match state
            .selected_project_type()
            .and_then(|t| catalog.project_type_info(t))
        {
            Some(info) => writeln!(
                self.output,
                "  {}  {}",
                info.name,
                format_price(info.base_price)
            )?,
            None => writeln!(self.output, "  No project type selected")?,
        }
        for addon in state.selected_addons() {
            writeln!(
                self.output,
                "  + {}  {}",
                addon.addon.label,
                format_price(addon.price())
            )?;
        }
        if !state.notes().is_empty() {
            writeln!(self.output, "  Notes: {}", state.notes())?;
        }
        writeln!(self.output, "  Total: {}", format_price(state.total_cost()))?;
        Ok(())
    }
}

fn field_prompt(
    label: &str,
    current: &str,
) -> String {
    if current.is_empty() {
        format!("{label}:")
    } else {
        format!("{label} [{current}]:")
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn parse_yes_no(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "y" | "yes" | "t" | "tak" => Some(true),
        "n" | "no" | "nie" => Some(false),
        _ => None,
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
