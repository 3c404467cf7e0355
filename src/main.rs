use anyhow::{bail, Context, Result};
use clap::Parser;
use provstamp::cli::{Command, ConfigAction, ConfigArgs, ReportArgs, RootArgs};
use provstamp::config::ConfigStore;
use provstamp::report;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = RootArgs::parse();
    match cli.command {
        Command::Report(args) => cmd_report(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn cmd_report(args: ReportArgs) -> Result<()> {
    let config = ConfigStore::open_default()?;
    let report = report::gather(&config, &args.asset, args.full)?;
    let text = serde_json::to_string_pretty(&report).context("serialize report")?;
    match args.out {
        Some(path) => {
            std::fs::write(&path, text.as_bytes())
                .with_context(|| format!("write {}", path.display()))?;
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Get { key } => {
            let config = ConfigStore::open_default()?;
            match config.get(&key) {
                Some(toml::Value::String(text)) => println!("{text}"),
                Some(value) => println!("{value}"),
                None => bail!("no config value at {key}"),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = ConfigStore::open_default()?;
            config.set(&key, toml::Value::String(value))?;
            config.save()?;
        }
    }
    Ok(())
}
