use anyhow::Result;
use clap::ArgMatches;
use log::LevelFilter;
use std::path::PathBuf;

use chrot_cli::cli::build_cli;
use chrot_cli::rotation::inference::inference;
use chrot_cli::rotation::inference::input::PredictConfig;
use chrot_cli::rotation::train::input::TrainConfig;
use chrot_cli::rotation::train::trainer;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("CHROT_LOG", "error,chrot=info"))
        .init();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("train", train_matches)) => handle_train(train_matches),
        Some(("predict", predict_matches)) => handle_predict(predict_matches),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    if let Some(path) = config_path {
        log::info!("[chrot::train] Training from config: {:?}", path);
    }

    let params = TrainConfig::from_arguments(config_path, matches)?;

    match trainer::run_training(&params) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    if let Some(path) = config_path {
        log::info!("[chrot::predict] Inference using config: {:?}", path);
    }

    let params = PredictConfig::from_arguments(config_path, matches)?;

    match inference::run_inference(&params) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Inference failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
