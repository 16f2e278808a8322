use clap::{Arg, ArgAction, Command, ValueHint};
use std::path::PathBuf;

pub fn build_cli() -> Command {
    Command::new("chrot")
        .version(clap::crate_version!())
        .about("Cluster-head rotation classifier for wireless sensor networks")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train a random forest on sensor data, synthesizing labels if needed")
                .arg(
                    Arg::new("config")
                        .help("Path to training configuration file (JSON)")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("train_data")
                        .short('d')
                        .long("train_data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to training data. Overrides the training data file \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("model_path")
                        .short('o')
                        .long("model_path")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "File path that the trained model will be written to. \
                             Overrides the model path specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("updated_data")
                        .long("updated_data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Where to write the dataset when labels are synthesized.")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(clap::value_parser!(u64))
                        .help("Seed for label noise, making synthesized labels reproducible."),
                )
                .arg(
                    Arg::new("no_report")
                        .long("no-report")
                        .help("Disable HTML report generation.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Predict cluster-head rotation for new sensor data using a trained model")
                .arg(
                    Arg::new("config")
                        .help("Path to inference configuration file (JSON)")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("model_path")
                        .short('m')
                        .long("model")
                        .help("Path to the trained model file")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("inference_data")
                        .short('d')
                        .long("inference_data")
                        .help("Path to the input data file (*.csv or *.tsv)")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .help("Path to the output file for predictions (*.csv or *.tsv)")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("probability")
                        .long("probability")
                        .help("Also write the predicted probability of rotation.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
}
