mod cli;
mod config;
mod render;

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use config::ProjectConfig;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Query(args) => {
            let project = ProjectConfig::load(&args.config.path, args.config.explicit)?;
            println!("{}", render::render_query(&args, &project)?);
            Ok(())
        }
        cli::Command::Scope(args) => {
            let project = ProjectConfig::load(&args.config.path, args.config.explicit)?;
            println!("{}", render::render_scope(&args, &project)?);
            Ok(())
        }
        cli::Command::Config(args) => {
            let project = ProjectConfig::load(&args.config.path, args.config.explicit)?;
            println!("{}", config_table(&project)?);
            Ok(())
        }
    }
}

fn config_table(project: &ProjectConfig) -> anyhow::Result<Table> {
    let cfg = project.client_config()?;
    let defaults = &project.file.defaults;
    let source = project
        .config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_string());
    let none = || "-".to_string();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Setting").add_attribute(Attribute::Bold).fg(Color::Cyan),
            Cell::new("Value").add_attribute(Attribute::Bold).fg(Color::Cyan),
        ]);

    let rows = [
        ("config file", source),
        ("region", cfg.region.clone()),
        ("database", cfg.database.clone()),
        (
            "timeout",
            cfg.timeout.map(|t| format!("{}s", t.as_secs())).unwrap_or_else(none),
        ),
        ("poll interval", format!("{}ms", cfg.poll_interval.as_millis())),
        ("default galaxy", defaults.galaxy.clone().unwrap_or_else(none)),
        (
            "default universe time",
            defaults.universe_time.map(|t| t.to_string()).unwrap_or_else(none),
        ),
        (
            "default limit",
            defaults.limit.map(|l| l.to_string()).unwrap_or_else(none),
        ),
    ];
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key).fg(Color::Yellow), Cell::new(value)]);
    }

    Ok(table)
}
