//! Casebook CLI - Extract use cases from a document and mail them as DOCX.

use casebook_cli::{
    Cli, CliError, DocxRenderer, FileDocumentReader, Formatter, Pipeline, RunConfig, RunRequest,
    Settings, SmtpMailer,
};
use casebook_extractor::Extractor;
use casebook_gatekeeper::RecipientValidator;
use casebook_llm::HuggingFaceProvider;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, !cli.no_color);

    let formatter = Formatter::new(cli.format.into(), !cli.no_color);
    if let Err(e) = run(cli, &formatter).await {
        eprintln!("{}", formatter.error(&format!("Error: {}", e)));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool, ansi: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .init();
}

async fn run(cli: Cli, formatter: &Formatter) -> casebook_cli::Result<()> {
    let settings = Settings::from_env(!cli.dry_run)?;
    tracing::debug!(?settings, "Settings loaded");

    let run_config = match (&cli.config, cli.preset) {
        (Some(path), _) => RunConfig::load(path)?,
        (None, Some(preset)) => RunConfig::from_extractor(preset.into()),
        (None, None) => RunConfig::default(),
    };

    let mut llm = HuggingFaceProvider::new(
        settings.model.token.as_str(),
        settings.model.model.as_str(),
        settings.model.timeout(),
    )?;
    if let Some(endpoint) = &settings.model.endpoint {
        llm = llm.with_endpoint(endpoint.as_str());
    }
    let extractor = Extractor::new(llm, run_config.extractor)?;

    let mailer = if cli.dry_run {
        None
    } else {
        let smtp = settings
            .smtp
            .as_ref()
            .ok_or_else(|| CliError::Config("SMTP settings are missing".into()))?;
        Some(SmtpMailer::new(smtp)?)
    };

    let pipeline = Pipeline::new(
        FileDocumentReader::new(),
        extractor,
        DocxRenderer::new(),
        mailer,
        RecipientValidator::new(run_config.recipients),
    );

    let request = RunRequest {
        input: cli.input,
        recipients: cli.recipients,
        save: cli.save,
    };
    let report = pipeline.run(&request).await?;

    let output = formatter.format_report(&report)?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
