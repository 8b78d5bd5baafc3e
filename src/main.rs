use clap::Parser;
use std::fs;
use std::io::{self, Write};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use todo_agenda::cli::Cli;
use todo_agenda::loader::{load_dir, toggle_in_file};
use todo_agenda::render::{
    render_html, render_markdown, render_summary_html, render_summary_markdown,
};
use todo_agenda::{count, is_completed_on, normalize, select, summarize, Bucket, Day, Error};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "todo_agenda=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let now = cli.reference_time()?;
    let today = normalize(now);

    let output = if let Some(ref id) = cli.toggle {
        toggle_task(&cli, id, today)?
    } else {
        let loaded = load_dir(&cli.dir, &cli.glob)?;
        info!(tasks = loaded.tasks.len(), %today, agenda = %cli.agenda, "evaluating agenda");
        let opts = cli.query_options();

        if cli.agenda == "summary" {
            let counts = summarize(&loaded.tasks, now, &opts);
            match cli.format.as_str() {
                "md" => render_summary_markdown(today, &counts),
                "html" => render_summary_html(today, &counts),
                _ => serde_json::to_string_pretty(&serde_json::json!({
                    "date": today,
                    "counts": counts,
                }))?,
            }
        } else {
            let bucket: Bucket = cli.agenda.parse()?;
            if cli.count {
                format!("{}\n", count(&loaded.tasks, now, bucket, &opts))
            } else {
                let tasks = select(&loaded.tasks, now, bucket, &opts);
                match cli.format.as_str() {
                    "md" => render_markdown(bucket, today, &tasks),
                    "html" => render_html(bucket, today, &tasks),
                    _ => serde_json::to_string_pretty(&serde_json::json!({
                        "bucket": bucket.name(),
                        "date": today,
                        "count": tasks.len(),
                        "tasks": tasks,
                    }))?,
                }
            }
        }
    };

    if let Some(out_path) = cli.output {
        fs::write(out_path, output)?;
    } else {
        io::stdout().write_all(output.as_bytes())?;
    }

    Ok(())
}

/// Flip one occurrence of a task in the file it was loaded from
fn toggle_task(cli: &Cli, id: &str, day: Day) -> Result<String, Box<dyn std::error::Error>> {
    let loaded = load_dir(&cli.dir, &cli.glob)?;
    let path = loaded
        .source_of(id)
        .ok_or_else(|| Error::TaskNotFound(id.to_string()))?
        .to_path_buf();

    let task = toggle_in_file(&path, id, day)?;

    info!(
        id,
        %day,
        completed = is_completed_on(&task.completion_state, task.recurrence_rule, day),
        path = %path.display(),
        "toggled completion"
    );
    Ok(serde_json::to_string_pretty(&task)?)
}
