/// Structure representing command-line arguments.
#[derive(Debug)]
pub struct Args {
    pub input: std::path::PathBuf,
    pub asset: String,
    pub exclude: Vec<std::path::PathBuf>,
    pub config: Option<std::path::PathBuf>,
    pub output: Option<std::path::PathBuf>,
    pub threads: Option<usize>,
    pub window: Option<usize>,
    pub truncation_method: Option<String>,
    pub window_pattern: Option<usize>,
    pub subsampling: Option<usize>,
}

impl Args {
    /// Parses command-line arguments using `clap`.
    pub fn parse() -> Self {
        let matches = clap::Command::new("vol_cli")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Estimate jump-robust intraday volatility and its diurnal pattern")
            .arg(
                clap::Arg::new("input")
                    .short('i')
                    .long("input")
                    .help("Directory with one <asset>_<YYYY-MM-DD>.csv file per day")
                    .required(true)
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("asset")
                    .short('a')
                    .long("asset")
                    .help("Asset prefix of the price files")
                    .default_value("spy")
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("exclude")
                    .short('x')
                    .long("exclude")
                    .help("File of dates (YYYY-MM-DD, one per line) to leave out; repeatable")
                    .action(clap::ArgAction::Append)
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("config")
                    .short('c')
                    .long("config")
                    .help("JSON file with estimator settings")
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("output")
                    .short('o')
                    .long("output")
                    .help("Pattern CSV destination (default: stdout)")
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("threads")
                    .short('t')
                    .long("threads")
                    .help("Number of threads to use (default: all available)")
                    .num_args(1)
                    .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
            )
            .arg(
                clap::Arg::new("window")
                    .short('w')
                    .long("window")
                    .help("Rolling window length in observations")
                    .num_args(1)
                    .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
            )
            .arg(
                clap::Arg::new("truncation")
                    .long("truncation")
                    .help("Jump truncation method")
                    .value_parser(["STD3", "STD5", "BIVAR3", "BIVAR5", "NONE"])
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("window_pattern")
                    .long("window-pattern")
                    .help("Days per rolling sub-pattern")
                    .num_args(1)
                    .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
            )
            .arg(
                clap::Arg::new("subsampling")
                    .short('s')
                    .long("subsampling")
                    .help("Keep every n-th observation")
                    .num_args(1)
                    .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
            )
            .get_matches();

        let path = |id: &str| matches.get_one::<String>(id).map(std::path::PathBuf::from);
        Args {
            input: path("input").unwrap_or_default(),
            asset: matches
                .get_one::<String>("asset")
                .cloned()
                .unwrap_or_else(|| "spy".to_string()),
            exclude: matches
                .get_many::<String>("exclude")
                .map(|files| files.map(std::path::PathBuf::from).collect())
                .unwrap_or_default(),
            config: path("config"),
            output: path("output"),
            threads: matches.get_one::<usize>("threads").copied(),
            window: matches.get_one::<usize>("window").copied(),
            truncation_method: matches.get_one::<String>("truncation").cloned(),
            window_pattern: matches.get_one::<usize>("window_pattern").copied(),
            subsampling: matches.get_one::<usize>("subsampling").copied(),
        }
    }
}

/// Validates that a count argument is a positive integer.
fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_usize_positive() {
        assert_eq!(parse_usize_positive("12"), Ok(12));
        assert!(parse_usize_positive("0").is_err());
        assert!(parse_usize_positive("-1").is_err());
    }
}
