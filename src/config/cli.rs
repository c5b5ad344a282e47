use super::app::{self, Backend};
use clap::{Command, CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    name = "lumadim",
    version = env!("LUMADIM_VERSION"),
    about = "Sets display brightness based on the luminance of the currently displayed content",
    after_help = "The single-dash forms -max and -min are accepted as well."
)]
pub struct Cli {
    /// Difference between the previous and the next brightness needed to set a new one [default: 5, min: 5]
    #[arg(short = 't', long, value_name = "PERCENT", value_parser = parse_tolerance)]
    pub tolerance: Option<u64>,

    /// Max brightness [default: 100, max: 100]
    #[arg(long = "max", value_name = "PERCENT", value_parser = parse_max_brightness)]
    pub max_brightness: Option<u64>,

    /// Min brightness [default: 0]
    #[arg(long = "min", value_name = "PERCENT", value_parser = parse_min_brightness)]
    pub min_brightness: Option<u64>,

    /// Wait time before the next luminance calculation [default: 0.5, min: 0.1]
    #[arg(short, long, value_name = "SECONDS", value_parser = parse_interval)]
    pub interval: Option<f64>,

    /// Index of the display to control, among the brightness-capable ones [default: 0]
    #[arg(short, long, value_name = "INDEX")]
    pub display: Option<usize>,

    /// How brightness is controlled [default: ddcutil]
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Sample the screen back to back, without waiting between ticks
    #[arg(long)]
    pub no_sleep: bool,

    /// Print the brightness-capable displays with their current brightness and exit
    #[arg(long)]
    pub list: bool,

    /// Config file to read instead of $XDG_CONFIG_HOME/lumadim/config.toml
    #[arg(long, value_name = "PATH", allow_hyphen_values = true)]
    pub config: Option<PathBuf>,
}

// clap has no single-dash long flags, so `-max` and `-min` become `--max` and `--min`. Option
// values and everything after `--` are passed through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut command = Cli::command();
    command.build();
    let mut args = args.into_iter().map(Into::into);
    let mut normalized = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--" {
            normalized.push(arg);
            normalized.extend(args.by_ref());
            break;
        }

        let arg = rewrite_legacy_flag(arg);
        let value_follows = arg
            .to_str()
            .is_some_and(|flag| takes_separate_value(&command, flag));
        normalized.push(arg);
        if value_follows {
            normalized.extend(args.next());
        }
    }

    normalized
}

fn rewrite_legacy_flag(arg: OsString) -> OsString {
    let rewritten = arg.to_str().and_then(|s| {
        ["-max", "-min"].iter().find_map(|flag| {
            s.strip_prefix(flag)
                .filter(|rest| rest.is_empty() || rest.starts_with('='))
                .map(|rest| OsString::from(format!("-{flag}{rest}")))
        })
    });
    rewritten.unwrap_or(arg)
}

fn takes_separate_value(command: &Command, flag: &str) -> bool {
    command
        .get_arguments()
        .filter(|arg| arg.get_action().takes_values())
        .any(|arg| {
            arg.get_short().is_some_and(|short| flag == format!("-{short}"))
                || arg.get_long().is_some_and(|long| flag == format!("--{long}"))
        })
}

fn parse_integer(s: &str) -> Result<u64, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{s}' is not a non-negative integer"));
    }
    s.parse().map_err(|err| format!("'{s}': {err}"))
}

fn parse_tolerance(s: &str) -> Result<u64, String> {
    app::validate_tolerance(parse_integer(s)?).map_err(|err| err.to_string())
}

fn parse_max_brightness(s: &str) -> Result<u64, String> {
    app::validate_max_brightness(parse_integer(s)?).map_err(|err| err.to_string())
}

fn parse_min_brightness(s: &str) -> Result<u64, String> {
    app::validate_min_brightness(parse_integer(s)?).map_err(|err| err.to_string())
}

fn parse_interval(s: &str) -> Result<f64, String> {
    let value = s
        .parse::<f64>()
        .map_err(|_| format!("'{s}' is not a number of seconds"))?;
    app::validate_interval(value)
        .map(|_| value)
        .map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(normalize_args(
            std::iter::once("lumadim").chain(args.iter().copied()),
        ))
    }

    #[test]
    fn test_normalize_args_rewrites_single_dash_long_flags() {
        assert_eq!(
            normalize_args(["lumadim", "-max", "90", "-min=10", "-t", "10", "-maxx"]),
            vec!["lumadim", "--max", "90", "--min=10", "-t", "10", "-maxx"]
        );
    }

    #[test]
    fn test_normalize_args_leaves_option_values_alone() {
        assert_eq!(
            normalize_args(["lumadim", "--config", "-max", "-t", "-min", "-i", "1"]),
            vec!["lumadim", "--config", "-max", "-t", "-min", "-i", "1"]
        );
        assert_eq!(
            normalize_args(["lumadim", "-max", "-min", "--min", "-max"]),
            vec!["lumadim", "--max", "-min", "--min", "-max"]
        );
    }

    #[test]
    fn test_normalize_args_stops_at_double_dash() {
        assert_eq!(
            normalize_args(["lumadim", "-min", "5", "--", "-max", "-min"]),
            vec!["lumadim", "--min", "5", "--", "-max", "-min"]
        );
    }

    #[test]
    fn test_parse_config_path_that_looks_like_a_flag() {
        let cli = parse(&["--config", "-max"]).unwrap();

        assert_eq!(Some(PathBuf::from("-max")), cli.config);
        assert_eq!(None, cli.max_brightness);
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = parse(&["-t", "10", "-max", "90", "-min", "10", "-i", "0.1"]).unwrap();

        assert_eq!(Some(10), cli.tolerance);
        assert_eq!(Some(90), cli.max_brightness);
        assert_eq!(Some(10), cli.min_brightness);
        assert_eq!(Some(0.1), cli.interval);
        assert!(!cli.no_sleep);
        assert!(!cli.list);
    }

    #[test]
    fn test_parse_absent_flags_stay_unset() {
        let cli = parse(&[]).unwrap();

        assert_eq!(None, cli.tolerance);
        assert_eq!(None, cli.max_brightness);
        assert_eq!(None, cli.min_brightness);
        assert_eq!(None, cli.interval);
        assert_eq!(None, cli.backend);
    }

    #[test]
    fn test_parse_backend() {
        assert_eq!(
            Some(Backend::Backlight),
            parse(&["--backend", "backlight"]).unwrap().backend
        );
        assert_eq!(
            Some(Backend::DdcUtil),
            parse(&["--backend", "ddcutil"]).unwrap().backend
        );
    }

    #[test]
    fn test_parse_reports_validation_errors() {
        let err = parse(&["-t", "4"]).unwrap_err();

        assert_eq!(ErrorKind::ValueValidation, err.kind());
        assert!(err.to_string().contains("must be at least 5"));
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        let cases: &[&[&str]] = &[
            &["-t", "4"],
            &["-t", "five"],
            &["-t", "-5"],
            &["-max", "101"],
            &["-max", "9.5"],
            &["-min", "-1"],
            &["-i", "0.05"],
            &["-i", "fast"],
            &["-i", "inf"],
            &["-i", "1e20"],
        ];

        for args in cases {
            assert!(parse(args).is_err(), "{args:?} was not rejected");
        }
    }
}
