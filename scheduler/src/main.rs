use adaptive_scheduler::scheduler::{Config, DisplayTerminal, OutputFormat, RunOutcome};
use anyhow::{Context, Result};
use env_logger::Builder as LogBuilder;
use log::LevelFilter;
use std::env;

fn main() -> Result<()> {
    let config = Config::from_args()?;

    let mut logger = LogBuilder::from_default_env();
    if env::var_os("RUST_LOG").is_none() {
        logger.filter_level(match config.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        });
    }
    logger.init();

    let table = config
        .load_processes()
        .context("Failed to load the process list")?;
    let outcomes = run_policies(&config, table.processes())?;

    match config.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        OutputFormat::Text => outcomes.iter().for_each(print_outcome),
    }
    Ok(())
}

fn run_policies(
    config: &Config,
    processes: &[adaptive_scheduler::ProcessRecord],
) -> Result<Vec<RunOutcome>> {
    let mut outcomes = Vec::with_capacity(config.policies.len());

    if config.visualize {
        let mut display =
            DisplayTerminal::with_delay(config.delay).context("Failed to set up the terminal")?;
        for policy in &config.policies {
            display.start_run(policy.name());
            let outcome = policy
                .run_with(processes, &mut display, true)
                .with_context(|| format!("{policy} failed"))?;
            let cancelled = !outcome.is_complete();
            outcomes.push(outcome);
            if cancelled {
                break;
            }
        }
    } else {
        for policy in &config.policies {
            outcomes.push(
                policy
                    .run(processes)
                    .with_context(|| format!("{policy} failed"))?,
            );
        }
    }
    Ok(outcomes)
}

fn print_outcome(outcome: &RunOutcome) {
    let report = outcome.report();
    println!("== {} ==", report.policy);
    if !outcome.is_complete() {
        println!("(cancelled, partial results)");
    }

    let gantt: Vec<String> = report
        .timeline
        .segments()
        .iter()
        .map(|segment| format!("P{} {:.2}-{:.2}", segment.process, segment.start, segment.end))
        .collect();
    println!("Gantt: | {} |", gantt.join(" | "));

    println!(
        "{:>4} {:>11} {:>11} {:>9} {:>9}",
        "PID", "Completion", "Turnaround", "Waiting", "Response"
    );
    for process in &report.processes {
        println!(
            "{:>4} {:>11.2} {:>11.2} {:>9.2} {:>9.2}",
            process.id, process.completion, process.turnaround, process.waiting, process.response
        );
    }

    match &report.metrics {
        Some(metrics) => {
            println!("Average waiting time: {:.2}", metrics.avg_waiting);
            println!("Average turnaround time: {:.2}", metrics.avg_turnaround);
            println!("Average response time: {:.2}", metrics.avg_response);
            println!("Completion time: {:.2}", metrics.total_completion_time);
        }
        None => println!("No process completed."),
    }
    println!();
}
