//! CLI argument parsing using clap derive

use clap::Parser;

/// Merge two HCL config files
///
/// Blocks of FILE1 are layered over FILE2 and the merged content is saved
/// into DEST.
#[derive(Parser, Debug)]
#[command(name = "hclmerge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file 1, merged on top of file 2
    #[arg(short = '1', long, value_name = "PATH")]
    pub file1: String,

    /// Config file 2, the base
    #[arg(short = '2', long, value_name = "PATH")]
    pub file2: String,

    /// File to save merged content; an empty value prints it to stdout
    #[arg(short, long, value_name = "PATH")]
    pub dest: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_short_flags() {
        let cli = Cli::try_parse_from(["hclmerge", "-1", "a.hcl", "-2", "b.hcl", "-d", "out.hcl"])
            .unwrap();
        assert_eq!(cli.file1, "a.hcl");
        assert_eq!(cli.file2, "b.hcl");
        assert_eq!(cli.dest, "out.hcl");
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_long_flags_with_empty_dest() {
        let cli = Cli::try_parse_from([
            "hclmerge", "--file1", "a.hcl", "--file2", "b.hcl", "--dest", "", "--verbose",
        ])
        .unwrap();
        assert_eq!(cli.dest, "");
        assert!(cli.verbose);
    }

    #[test]
    fn missing_dest_is_rejected() {
        let err = Cli::try_parse_from(["hclmerge", "-1", "a.hcl", "-2", "b.hcl"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
