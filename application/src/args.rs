//! [`Args`] definitions.

use clap::Parser;

/// Backend of the drama streaming site.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    ///
    /// A missing file is fine, defaults and `CONF.` environment variables
    /// apply then.
    #[arg(
        short,
        long,
        env = "DRAMA_PHIM_CONFIG",
        default_value = "config.toml"
    )]
    pub config: String,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// If the arguments are malformed or `--help`/`--version` is requested.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::Args;

    #[test]
    fn defaults_config_path() {
        let args = Args::try_parse_from(["drama-phim"]).unwrap();

        assert!(!args.config.is_empty());
    }

    #[test]
    fn takes_config_path() {
        let args =
            Args::try_parse_from(["drama-phim", "-c", "/etc/phim.toml"])
                .unwrap();

        assert_eq!(args.config, "/etc/phim.toml");
    }
}
