//! Minimal CLI parsing for one-shot commands.

use std::env;

#[derive(Debug, Default, PartialEq)]
pub struct CliOptions {
    /// Print the GraphQL SDL and exit
    pub print_schema: bool,
    /// Seed demo data regardless of `SEED_DEMO_DATA`
    pub seed: bool,
}

impl CliOptions {
    pub fn from_args() -> Self {
        Self::parse(env::args().skip(1))
    }

    pub fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut options = CliOptions::default();
        for arg in args {
            match arg.as_str() {
                "--print-schema" => options.print_schema = true,
                "--seed" => options.seed = true,
                other => tracing::warn!(arg = other, "Ignoring unknown argument"),
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_flags() {
        let args = ["--seed", "--bogus", "--print-schema"].map(String::from);
        assert_eq!(
            CliOptions::parse(args),
            CliOptions {
                print_schema: true,
                seed: true
            }
        );
        assert_eq!(CliOptions::parse(Vec::new()), CliOptions::default());
    }
}
