use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// System health monitor with anomaly detection and desktop alerts
#[derive(Parser, Debug)]
#[command(name = "pc_doctor")]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the polling loop (default)
    Run,
    /// Fit the offline model on labeled CSV corpora
    Train(TrainArgs),
    /// Append live snapshots to a labeled CSV corpus
    Collect(CollectArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[arg(long)]
    pub normal: PathBuf,
    #[arg(long)]
    pub high_load: PathBuf,
    #[arg(long)]
    pub malicious: PathBuf,
    /// Where the model artifact is written
    #[arg(long)]
    pub output: PathBuf,
    /// Overrides `model.trees`
    #[arg(long)]
    pub trees: Option<usize>,
    /// Overrides `model.sample_size`
    #[arg(long)]
    pub sample_size: Option<usize>,
    /// Overrides `model.contamination`
    #[arg(long)]
    pub contamination: Option<f64>,
    /// Overrides `model.seed`
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct CollectArgs {
    #[arg(long)]
    pub output: PathBuf,
    #[arg(long, value_enum)]
    pub label: CorpusLabel,
    #[arg(long)]
    pub samples: usize,
    #[arg(long, default_value_t = 1)]
    pub interval_secs: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum CorpusLabel {
    Normal,
    HighLoad,
    Malicious,
}

impl CorpusLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            CorpusLabel::Normal => "normal",
            CorpusLabel::HighLoad => "high_load",
            CorpusLabel::Malicious => "malicious",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::{Cli, Command, CorpusLabel};

    #[test]
    fn bare_invocation_runs_with_default_config() {
        let cli = Cli::try_parse_from(["pc_doctor"]).expect("bare invocation parses");
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn train_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "pc_doctor",
            "train",
            "--normal",
            "n.csv",
            "--high-load",
            "h.csv",
            "--malicious",
            "m.csv",
            "--output",
            "model.json",
            "--trees",
            "50",
        ])
        .expect("train parses");

        let Some(Command::Train(args)) = cli.command else {
            panic!("expected train command");
        };
        assert_eq!(args.high_load, PathBuf::from("h.csv"));
        assert_eq!(args.trees, Some(50));
        assert_eq!(args.contamination, None);
    }

    #[test]
    fn collect_parses_snake_case_labels() {
        let cli = Cli::try_parse_from([
            "pc_doctor",
            "--config",
            "alt.toml",
            "collect",
            "--output",
            "load.csv",
            "--label",
            "high_load",
            "--samples",
            "3",
        ])
        .expect("collect parses");

        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        let Some(Command::Collect(args)) = cli.command else {
            panic!("expected collect command");
        };
        assert_eq!(args.label, CorpusLabel::HighLoad);
        assert_eq!(args.label.as_str(), "high_load");
        assert_eq!(args.interval_secs, 1);
    }

    #[test]
    fn train_requires_all_corpora() {
        assert!(Cli::try_parse_from(["pc_doctor", "train", "--normal", "n.csv"]).is_err());
    }
}
