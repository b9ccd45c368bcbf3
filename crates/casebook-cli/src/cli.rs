//! CLI argument definitions and parsing.

use casebook_extractor::ExtractorConfig;
use clap::Parser;
use std::path::PathBuf;

/// Casebook - Extract use cases from a business document and mail them as DOCX.
#[derive(Debug, Parser)]
#[command(name = "casebook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source document (.pdf, .docx, .txt or .md)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Recipients file, one address per line
    #[arg(short, long)]
    pub recipients: PathBuf,

    /// TOML file with [extractor] and [recipients] tuning
    #[arg(short, long, conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Extractor preset
    #[arg(short, long, value_enum)]
    pub preset: Option<Preset>,

    /// Also write the rendered document to this path
    #[arg(short, long)]
    pub save: Option<PathBuf>,

    /// Skip sending mail; the document is saved locally instead
    #[arg(long)]
    pub dry_run: bool,

    /// Console summary format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (titles only)
    Quiet,
}

/// Extractor tuning presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// Default settings: sequential, moderate chunks
    Balanced,
    /// Larger chunks, fewer retries, four chunks in flight
    Fast,
    /// Smaller chunks, long timeouts, many retries
    Thorough,
}

impl From<Preset> for ExtractorConfig {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Balanced => ExtractorConfig::default(),
            Preset::Fast => ExtractorConfig::fast(),
            Preset::Thorough => ExtractorConfig::thorough(),
        }
    }
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_arguments() {
        let cli = Cli::parse_from(["casebook", "--input", "brief.pdf", "--recipients", "to.txt"]);
        assert_eq!(cli.input, PathBuf::from("brief.pdf"));
        assert_eq!(cli.recipients, PathBuf::from("to.txt"));
        assert_eq!(cli.format, CliFormat::Table);
        assert!(!cli.dry_run);
        assert!(cli.preset.is_none());
    }

    #[test]
    fn test_missing_input_is_rejected() {
        assert!(Cli::try_parse_from(["casebook", "--recipients", "to.txt"]).is_err());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::parse_from([
            "casebook",
            "-i",
            "notes.md",
            "-r",
            "team.txt",
            "--preset",
            "thorough",
            "--save",
            "out.docx",
            "--dry-run",
            "--format",
            "json",
            "--no-color",
            "-v",
        ]);
        assert_eq!(cli.preset, Some(Preset::Thorough));
        assert_eq!(cli.save, Some(PathBuf::from("out.docx")));
        assert_eq!(cli.format, CliFormat::Json);
        assert!(cli.dry_run && cli.no_color && cli.verbose);
    }

    #[test]
    fn test_config_conflicts_with_preset() {
        let result = Cli::try_parse_from([
            "casebook",
            "-i",
            "a.txt",
            "-r",
            "b.txt",
            "--config",
            "tuning.toml",
            "--preset",
            "fast",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_preset_conversion() {
        assert_eq!(ExtractorConfig::from(Preset::Balanced), ExtractorConfig::default());
        assert_eq!(ExtractorConfig::from(Preset::Fast), ExtractorConfig::fast());
        assert_eq!(ExtractorConfig::from(Preset::Thorough), ExtractorConfig::thorough());
    }
}
