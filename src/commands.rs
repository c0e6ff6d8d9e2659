//! Typed commands for the interactive loop, and command-line flags.

use crate::session::{Buttons, DashboardState, Interaction, Panel, StudyId};

pub const HELP: &str = "\
commands:
  study N            select study N (1-25)
  toggle PANEL       flip a panel on/off (highrisk, benchmarks, heatmap)
  show PANEL         turn a panel on
  hide PANEL         turn a panel off
  explain            press \"Explain Heatmap\"
  email              press \"Generate CRA Email\"
  refresh            re-run the page
  help               this text
  quit               leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Interact(Interaction),
    Help,
    Quit,
}

pub fn parse_panel(raw: &str) -> Result<Panel, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "highrisk" | "high-risk" | "risk" => Ok(Panel::HighRisk),
        "benchmarks" | "bench" | "ranking" => Ok(Panel::Benchmarks),
        "heatmap" | "corr" | "correlation" => Ok(Panel::Heatmap),
        other => Err(format!(
            "unknown panel {:?} (expected highrisk, benchmarks or heatmap)",
            other
        )),
    }
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(Command::Interact(Interaction::Load));
    };
    let arg = parts.next();
    if let Some(extra) = parts.next() {
        return Err(format!("unexpected argument {:?}", extra));
    }
    let verb = verb.to_ascii_lowercase();
    let need = |what: &str| arg.ok_or_else(|| format!("`{}` needs {}", verb, what));
    let bare = |cmd: Command| match arg {
        Some(_) => Err(format!("`{}` takes no argument", verb)),
        None => Ok(cmd),
    };

    match verb.as_str() {
        "study" | "s" => Ok(Command::Interact(Interaction::SelectStudy(
            need("a study id")?.parse()?,
        ))),
        "toggle" | "t" => Ok(Command::Interact(Interaction::Toggle(parse_panel(
            need("a panel")?,
        )?))),
        "show" => Ok(Command::Interact(Interaction::SetPanel(
            parse_panel(need("a panel")?)?,
            true,
        ))),
        "hide" => Ok(Command::Interact(Interaction::SetPanel(
            parse_panel(need("a panel")?)?,
            false,
        ))),
        "explain" | "x" => bare(Command::Interact(Interaction::ExplainHeatmap)),
        "email" | "e" => bare(Command::Interact(Interaction::GenerateEmail)),
        "refresh" | "r" => bare(Command::Interact(Interaction::Load)),
        "help" | "h" | "?" => bare(Command::Help),
        "quit" | "exit" | "q" => bare(Command::Quit),
        other => Err(format!("unknown command {:?} (try `help`)", other)),
    }
}

/// Options from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub study: Option<StudyId>,
    pub panels: Vec<Panel>,
    pub explain: bool,
    pub email: bool,
    pub once: bool,
    pub html: Option<String>,
    pub help: bool,
}

impl CliOptions {
    pub fn parse<I, S>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = CliOptions::default();
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            let arg = arg.as_ref();
            let mut value = |flag: &str| {
                iter.next()
                    .map(|v| v.as_ref().to_string())
                    .ok_or_else(|| format!("{} needs a value", flag))
            };
            match arg {
                "--study" => opts.study = Some(value(arg)?.parse()?),
                "--show" => {
                    for name in value(arg)?.split(',').filter(|s| !s.trim().is_empty()) {
                        let panel = parse_panel(name)?;
                        if !opts.panels.contains(&panel) {
                            opts.panels.push(panel);
                        }
                    }
                }
                "--html" => opts.html = Some(value(arg)?),
                "--explain" => opts.explain = true,
                "--email" => opts.email = true,
                "--once" => opts.once = true,
                "-h" | "--help" => opts.help = true,
                other => return Err(format!("unknown argument {:?}", other)),
            }
        }
        Ok(opts)
    }

    /// State the first page opens with.
    pub fn initial_state(&self) -> DashboardState {
        let mut state = DashboardState {
            study: self.study.unwrap_or_default(),
            ..DashboardState::default()
        };
        for panel in &self.panels {
            state.set_shown(*panel, true);
        }
        state
    }

    /// Buttons pressed on the first page.
    pub fn buttons(&self) -> Buttons {
        Buttons {
            explain: self.explain,
            email: self.email,
        }
    }
}

pub const USAGE: &str = "\
usage: dqmonitor [--study N] [--show highrisk,benchmarks,heatmap] [--explain] [--email]
                 [--once] [--html PATH]

Renders the clinical data quality dashboard from the backend at $FLASK_URL.
Without --once, reads commands from stdin (type `help`).";

#[cfg(test)]
mod tests {
    use super::*;

    fn study(n: u8) -> StudyId {
        StudyId::new(n).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("study 7").unwrap(),
            Command::Interact(Interaction::SelectStudy(study(7)))
        );
        assert_eq!(
            parse_command("toggle risk").unwrap(),
            Command::Interact(Interaction::Toggle(Panel::HighRisk))
        );
        assert_eq!(
            parse_command("hide heatmap").unwrap(),
            Command::Interact(Interaction::SetPanel(Panel::Heatmap, false))
        );
        assert_eq!(
            parse_command("  EMAIL ").unwrap(),
            Command::Interact(Interaction::GenerateEmail)
        );
        assert_eq!(parse_command("").unwrap(), Command::Interact(Interaction::Load));
        assert_eq!(parse_command("q").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_command_errors() {
        assert!(parse_command("study 26").unwrap_err().contains("from 1 to 25"));
        assert!(parse_command("study").unwrap_err().contains("needs a study id"));
        assert!(parse_command("toggle sites").unwrap_err().contains("unknown panel"));
        assert!(parse_command("dance").unwrap_err().contains("unknown command"));
        assert!(parse_command("email now").unwrap_err().contains("takes no argument"));
        assert!(parse_command("study 3 4").unwrap_err().contains("unexpected argument"));
    }

    #[test]
    fn test_cli_options() {
        let opts = CliOptions::parse([
            "--study", "5", "--show", "heatmap,bench,heatmap", "--email", "--once",
        ])
        .unwrap();
        assert_eq!(opts.study, Some(study(5)));
        assert_eq!(opts.panels, vec![Panel::Heatmap, Panel::Benchmarks]);
        assert!(opts.email && opts.once && !opts.explain);
        let state = opts.initial_state();
        assert_eq!(state.study, study(5));
        assert!(state.show_heatmap && state.show_benchmarks && !state.show_high_risk);
        assert_eq!(
            opts.buttons(),
            Buttons {
                explain: false,
                email: true
            }
        );
    }

    #[test]
    fn test_cli_defaults_and_errors() {
        let opts = CliOptions::parse(Vec::<String>::new()).unwrap();
        assert_eq!(opts.initial_state(), DashboardState::default());
        assert_eq!(opts.buttons(), Buttons::default());
        assert!(CliOptions::parse(["--study"]).unwrap_err().contains("needs a value"));
        assert!(CliOptions::parse(["--verbose"]).is_err());
    }
}
