//! Dashboard UI state and the interaction loop.
//!
//! Every interaction re-renders the whole page and re-fetches every visible
//! section. Nothing is cached between renders.

use std::fmt;

use crate::backend::Backend;
use crate::logging::{log_interaction, log_page};
use crate::sections;
use crate::widgets::{Page, Widget};

pub const STUDY_MIN: u8 = 1;
pub const STUDY_MAX: u8 = 25;

/// Study identifier, always within `STUDY_MIN..=STUDY_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StudyId(u8);

impl StudyId {
    pub fn new(id: u8) -> Option<Self> {
        (STUDY_MIN..=STUDY_MAX).contains(&id).then_some(Self(id))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All selectable studies in ascending order.
    pub fn all() -> impl Iterator<Item = StudyId> {
        (STUDY_MIN..=STUDY_MAX).map(StudyId)
    }
}

impl Default for StudyId {
    fn default() -> Self {
        Self(STUDY_MIN)
    }
}

impl fmt::Display for StudyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StudyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let out_of_range = || {
            format!(
                "study must be a number from {} to {}, got {:?}",
                STUDY_MIN, STUDY_MAX, s
            )
        };
        let n: u8 = s.trim().parse().map_err(|_| out_of_range())?;
        StudyId::new(n).ok_or_else(out_of_range)
    }
}

/// Toggleable sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    HighRisk,
    Benchmarks,
    Heatmap,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::HighRisk, Panel::Benchmarks, Panel::Heatmap];

    pub fn label(&self) -> &'static str {
        match self {
            Panel::HighRisk => "Show High-Risk Subjects",
            Panel::Benchmarks => "Show Study DQI Ranking",
            Panel::Heatmap => "Show DQI Relationship Heatmap",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Panel::HighRisk => "highrisk",
            Panel::Benchmarks => "benchmarks",
            Panel::Heatmap => "heatmap",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Initial render, or a plain re-run.
    Load,
    SelectStudy(StudyId),
    Toggle(Panel),
    SetPanel(Panel, bool),
    ExplainHeatmap,
    GenerateEmail,
}

impl Interaction {
    fn describe(&self) -> String {
        match self {
            Interaction::Load => "load".to_string(),
            Interaction::SelectStudy(id) => format!("select_study:{}", id),
            Interaction::Toggle(p) => format!("toggle:{}", p.key()),
            Interaction::SetPanel(p, on) => format!("set:{}={}", p.key(), on),
            Interaction::ExplainHeatmap => "explain_heatmap".to_string(),
            Interaction::GenerateEmail => "generate_email".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub study: StudyId,
    pub show_high_risk: bool,
    pub show_benchmarks: bool,
    pub show_heatmap: bool,
}

impl DashboardState {
    pub fn is_shown(&self, panel: Panel) -> bool {
        match panel {
            Panel::HighRisk => self.show_high_risk,
            Panel::Benchmarks => self.show_benchmarks,
            Panel::Heatmap => self.show_heatmap,
        }
    }

    pub fn set_shown(&mut self, panel: Panel, on: bool) {
        match panel {
            Panel::HighRisk => self.show_high_risk = on,
            Panel::Benchmarks => self.show_benchmarks = on,
            Panel::Heatmap => self.show_heatmap = on,
        }
    }
}

/// Buttons pressed on the current render only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    pub explain: bool,
    pub email: bool,
}

pub struct Dashboard<B: Backend> {
    backend: B,
    state: DashboardState,
}

impl<B: Backend> Dashboard<B> {
    pub fn new(backend: B) -> Self {
        Self::with_state(backend, DashboardState::default())
    }

    pub fn with_state(backend: B, state: DashboardState) -> Self {
        Self { backend, state }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// First render of a session: the current state plus any buttons
    /// pressed together, in a single pass.
    pub async fn open(&mut self, pressed: Buttons) -> Page {
        log_interaction("open", self.state.study.get());
        self.render(pressed).await
    }

    /// Apply `interaction` and render the full page.
    pub async fn interact(&mut self, interaction: Interaction) -> Page {
        log_interaction(&interaction.describe(), self.state.study.get());
        let mut pressed = Buttons::default();
        match interaction {
            Interaction::Load => {}
            Interaction::SelectStudy(id) => self.state.study = id,
            Interaction::Toggle(panel) => {
                let on = !self.state.is_shown(panel);
                self.state.set_shown(panel, on);
            }
            Interaction::SetPanel(panel, on) => self.state.set_shown(panel, on),
            Interaction::ExplainHeatmap => pressed.explain = true,
            Interaction::GenerateEmail => pressed.email = true,
        }
        self.render(pressed).await
    }

    async fn render(&self, pressed: Buttons) -> Page {
        let backend = &self.backend;
        let state = self.state;
        let mut page = Page::new();

        page.push(Widget::Title(sections::TITLE.to_string()));
        page.extend(sections::scorecard(backend).await);
        page.push(Widget::Select {
            label: "Select Study:".to_string(),
            value: state.study.to_string(),
        });
        page.extend(sections::study_summary(backend, state.study).await);
        for panel in Panel::ALL {
            let shown = state.is_shown(panel);
            page.push(Widget::Checkbox {
                label: panel.label().to_string(),
                checked: shown,
            });
            if !shown {
                continue;
            }
            page.extend(match panel {
                Panel::HighRisk => sections::high_risk(backend).await,
                Panel::Benchmarks => sections::benchmarks(backend).await,
                Panel::Heatmap => sections::heatmap(backend).await,
            });
        }
        page.push(Widget::Button {
            label: "Explain Heatmap".to_string(),
            pressed: pressed.explain,
        });
        if pressed.explain {
            page.extend(sections::heatmap_insight(backend).await);
        }
        page.push(Widget::Header("AI Assistant".to_string()));
        page.push(Widget::Button {
            label: "Generate CRA Email".to_string(),
            pressed: pressed.email,
        });
        if pressed.email {
            page.extend(sections::cra_email(backend, state.study).await);
        }

        log_page(page.widgets.len(), page.errors().len());
        page
    }
}
