use std::io::{IsTerminal, Write};

use anyhow::{anyhow, Result};
use dqmonitor::backend::HttpBackend;
use dqmonitor::commands::{parse_command, CliOptions, Command, HELP, USAGE};
use dqmonitor::config::DashboardConfig;
use dqmonitor::logging::{log, obj, ts_now, v_str, Domain, Level};
use dqmonitor::render::{render_html, TerminalRenderer};
use dqmonitor::session::Dashboard;
use dqmonitor::widgets::Page;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

struct Output {
    terminal: TerminalRenderer,
    html_path: Option<String>,
}

impl Output {
    fn show(&self, page: &Page) {
        print!("{}", self.terminal.render(page));
        let _ = std::io::stdout().flush();
        if let Some(path) = &self.html_path {
            if let Err(err) = std::fs::write(path, render_html(page, &ts_now())) {
                eprintln!("[html] failed to write {}: {}", path, err);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts =
        CliOptions::parse(std::env::args().skip(1)).map_err(|e| anyhow!("{}\n\n{}", e, USAGE))?;
    if opts.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let cfg = DashboardConfig::from_env()?;
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("base_url", v_str(&cfg.base_url)),
            ("once", json!(opts.once)),
        ]),
    );

    let output = Output {
        terminal: TerminalRenderer::new(cfg.color && std::io::stdout().is_terminal()),
        html_path: opts.html.clone().or_else(|| cfg.html_snapshot.clone()),
    };
    let mut dashboard = Dashboard::with_state(HttpBackend::new(&cfg), opts.initial_state());
    output.show(&dashboard.open(opts.buttons()).await);
    if opts.once {
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        let _ = std::io::stdout().flush();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Interact(interaction)) => {
                let page = dashboard.interact(interaction).await;
                output.show(&page);
            }
            Err(msg) => eprintln!("{}", msg),
        }
    }

    log(Level::Info, Domain::System, "shutdown", obj(&[]));
    Ok(())
}
