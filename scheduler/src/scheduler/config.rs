use super::{
    error::Result,
    process::{ProcessId, ProcessRecord, ProcessTable},
    round_robin::RoundRobinScheduler,
    runner::Policy,
    Time, DEFAULT_FRAME_DELAY,
};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub policies: Vec<Policy>,
    pub input: Option<PathBuf>,
    pub visualize: bool,
    pub delay: Duration,
    pub output: OutputFormat,
    pub verbosity: u8,
}

/// One entry of a JSON process list. Missing ids are assigned in file order.
#[derive(Debug, Deserialize)]
struct ProcessEntry {
    id: Option<ProcessId>,
    burst_time: Time,
    #[serde(default)]
    arrival_time: Time,
    #[serde(default)]
    priority: i32,
}

impl Config {
    pub fn command() -> Command {
        Command::new("adaptive-scheduler")
            .version(env!("CARGO_PKG_VERSION"))
            .about("CPU scheduling simulator with an adaptive-quantum round robin policy")
            .arg(
                Arg::new("policy")
                    .long("policy")
                    .short('p')
                    .value_name("NAME")
                    .default_value("adaptive")
                    .help(
                        "fcfs, sjf, sjf-preemptive, ljf, ljf-preemptive, priority, \
                         priority-preemptive, round-robin, adaptive or all",
                    ),
            )
            .arg(
                Arg::new("quantum")
                    .long("quantum")
                    .short('q')
                    .value_name("TIME")
                    .value_parser(value_parser!(f64))
                    .help("Time quantum of the fixed round robin policy"),
            )
            .arg(
                Arg::new("input")
                    .long("input")
                    .short('i')
                    .value_name("FILE")
                    .value_parser(value_parser!(PathBuf))
                    .help("JSON process list; the sample workload is used without it"),
            )
            .arg(
                Arg::new("visualize")
                    .long("visualize")
                    .action(ArgAction::SetTrue)
                    .help("Show the Gantt chart in the terminal segment by segment"),
            )
            .arg(
                Arg::new("delay-ms")
                    .long("delay-ms")
                    .value_name("MS")
                    .value_parser(value_parser!(u64))
                    .help("Time each segment stays on screen when visualizing"),
            )
            .arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Print the run reports as JSON"),
            )
            .arg(
                Arg::new("verbose")
                    .long("verbose")
                    .short('v')
                    .action(ArgAction::Count)
                    .help("Increase log verbosity"),
            )
    }

    pub fn from_args() -> Result<Self> {
        Config::from_matches(&Config::command().get_matches())
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let quantum = matches
            .get_one::<f64>("quantum")
            .copied()
            .unwrap_or(RoundRobinScheduler::DEFAULT_QUANTUM);

        let name = matches
            .get_one::<String>("policy")
            .map(String::as_str)
            .unwrap_or("adaptive");
        let policies = if name.eq_ignore_ascii_case("all") {
            Policy::all(quantum).to_vec()
        } else {
            match name.parse()? {
                Policy::RoundRobin { .. } => vec![Policy::RoundRobin { quantum }],
                policy => vec![policy],
            }
        };

        let delay = matches
            .get_one::<u64>("delay-ms")
            .map_or(DEFAULT_FRAME_DELAY, |&ms| Duration::from_millis(ms));
        let output = if matches.get_flag("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        Ok(Self {
            policies,
            input: matches.get_one::<PathBuf>("input").cloned(),
            visualize: matches.get_flag("visualize"),
            delay,
            output,
            verbosity: matches.get_count("verbose"),
        })
    }

    pub fn load_processes(&self) -> Result<ProcessTable> {
        match &self.input {
            Some(path) => {
                log::info!("loading processes from {}", path.display());
                parse_process_list(&fs::read_to_string(path)?)
            }
            None => Ok(ProcessTable::sample()),
        }
    }
}

pub fn parse_process_list(json: &str) -> Result<ProcessTable> {
    let entries: Vec<ProcessEntry> = serde_json::from_str(json)?;

    let mut table = ProcessTable::new();
    for entry in entries {
        match entry.id {
            Some(id) => table.insert(ProcessRecord::with_priority(
                id,
                entry.burst_time,
                entry.arrival_time,
                entry.priority,
            ))?,
            None => {
                table.add_process(entry.burst_time, entry.arrival_time, entry.priority)?;
            }
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::error::SchedulerError;

    fn config(args: &[&str]) -> Result<Config> {
        let matches = Config::command()
            .try_get_matches_from(std::iter::once("adaptive-scheduler").chain(args.iter().copied()))
            .unwrap();
        Config::from_matches(&matches)
    }

    #[test]
    fn defaults_to_the_adaptive_policy() {
        let config = config(&[]).unwrap();
        assert_eq!(config.policies, vec![Policy::Adaptive]);
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.delay, DEFAULT_FRAME_DELAY);
        assert!(!config.visualize);
        assert_eq!(config.load_processes().unwrap().len(), 10);
    }

    #[test]
    fn quantum_applies_to_round_robin() {
        let rr = config(&["--policy", "round-robin", "-q", "7.5", "--json", "-vv"]).unwrap();
        assert_eq!(rr.policies, vec![Policy::RoundRobin { quantum: 7.5 }]);
        assert_eq!(rr.output, OutputFormat::Json);
        assert_eq!(rr.verbosity, 2);

        let all = config(&["--policy", "all", "--quantum", "3"]).unwrap();
        assert_eq!(all.policies.len(), 9);
        assert!(all.policies.contains(&Policy::RoundRobin { quantum: 3.0 }));
    }

    #[test]
    fn unknown_policy_is_invalid_input() {
        let err = config(&["--policy", "lottery"]).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn parses_json_process_lists() {
        let table = parse_process_list(
            r#"[
                {"burst_time": 80, "arrival_time": 0, "priority": 1},
                {"id": 5, "burst_time": 60, "priority": 2},
                {"burst_time": 65.5}
            ]"#,
        )
        .unwrap();

        let ids: Vec<ProcessId> = table.processes().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![1, 5, 6]);
        assert_eq!(table.processes()[2].burst_time(), 65.5);
        assert_eq!(table.processes()[1].arrival_time(), 0.0);

        assert!(matches!(
            parse_process_list("[{\"priority\": 1}]"),
            Err(SchedulerError::Json(_))
        ));
    }

    #[test]
    fn accepts_the_largest_process_id() {
        let table = parse_process_list(r#"[{"id": 4294967295, "burst_time": 5}]"#).unwrap();
        assert_eq!(table.processes()[0].id(), ProcessId::MAX);

        let err = parse_process_list(r#"[{"id": 4294967295, "burst_time": 5}, {"burst_time": 1}]"#)
            .unwrap_err();
        assert!(matches!(err, SchedulerError::IdsExhausted));
        assert!(err.is_invalid_input());
    }
}
