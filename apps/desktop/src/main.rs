use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    FsUploadReader, HttpHealthApi, HttpImageAnalyzer, ImageAnalysisController, ImageAnalyzer,
    MissingImageAnalyzer, RecognitionConfig, SelectedFile, VoiceDiagnosisController,
};
use tracing_subscriber::EnvFilter;

mod config;
mod console_speech;
mod render;

use config::{load_settings, Settings};
use console_speech::ConsoleSpeechRecognizer;

#[derive(Parser, Debug)]
#[command(about = "Skin-image analysis and voice symptom diagnosis")]
struct Cli {
    /// Base address of the location, diagnosis, and medical-store service.
    #[arg(long)]
    api_base_url: Option<String>,
    /// Image analysis endpoint.
    #[arg(long)]
    analysis_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a skin-area photograph and show the analysis.
    Analyze { path: PathBuf },
    /// Describe symptoms by voice and get a diagnosis.
    Voice {
        /// Use this text instead of reading from the console.
        #[arg(long)]
        utterance: Option<String>,
        /// Also list nearby medical stores.
        #[arg(long)]
        stores: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(v) = cli.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = cli.analysis_url {
        settings.analysis_url = Some(v);
    }

    match cli.command {
        Command::Analyze { path } => analyze(&settings, path).await,
        Command::Voice { utterance, stores } => voice(&settings, utterance, stores).await,
    }
}

async fn analyze(settings: &Settings, path: PathBuf) -> Result<()> {
    let analyzer: Arc<dyn ImageAnalyzer> = match &settings.analysis_url {
        Some(url) => Arc::new(HttpImageAnalyzer::new(url, settings.request_timeout())?),
        None => {
            tracing::warn!("no image analysis endpoint configured");
            Arc::new(MissingImageAnalyzer)
        }
    };
    let mut controller = ImageAnalysisController::new(Arc::new(FsUploadReader), analyzer);

    let file = SelectedFile::from_path(&path)?;
    controller.submit_image(file);
    print!("{}", render::image_view(controller.state()));
    while controller.process_next().await {
        print!("{}", render::image_view(controller.state()));
    }
    Ok(())
}

async fn voice(settings: &Settings, utterance: Option<String>, stores: bool) -> Result<()> {
    let api = HttpHealthApi::with_timeout(&settings.api_base_url, settings.request_timeout())?;
    let mut controller = VoiceDiagnosisController::new(
        Arc::new(ConsoleSpeechRecognizer::new(utterance)),
        Arc::new(api),
        RecognitionConfig::single_utterance(settings.speech_locale.clone()),
    );

    controller.start_capture();
    print!("{}", render::voice_view(controller.state()));
    while controller.process_next().await {
        print!("{}", render::voice_view(controller.state()));
    }

    if stores {
        controller.fetch_medical_stores();
        controller.settle().await;
        print!("{}", render::voice_view(controller.state()));
    }
    Ok(())
}
