use clap::{Parser, Subcommand};
use deepcode_core::config::Environment;
use std::path::PathBuf;

/// deep-code - publish datasets and workflows to the Open Science Catalog
#[derive(Parser, Debug)]
#[command(name = "deep-code")]
#[command(about = "Publish dataset, workflow and experiment metadata to the Open Science Catalog", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Show planned actions without executing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish a dataset with its workflow and experiment records
    Publish(PublishArgs),

    /// Write dataset and workflow configuration templates
    GenerateConfig(GenerateConfigArgs),

    /// Check a dataset's attributes before publishing
    Lint(LintArgs),

    /// Show effective settings and where each value comes from
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct PublishArgs {
    /// Path to the dataset configuration (YAML)
    pub dataset_config: PathBuf,

    /// Path to the workflow configuration (YAML)
    pub workflow_config: PathBuf,

    /// Target environment (production, staging or testing)
    #[arg(long, short = 'e')]
    pub environment: Option<Environment>,

    /// Read base catalogs from this metadata repository checkout and write
    /// the generated files instead of opening a pull request
    #[arg(long, value_name = "REPO_DIR")]
    pub write_to_disk: Option<PathBuf>,

    /// Where --write-to-disk puts the generated files (defaults to REPO_DIR)
    #[arg(long, value_name = "DIR", requires = "write_to_disk")]
    pub output_dir: Option<PathBuf>,

    /// Open datasets from this local directory instead of object storage
    #[arg(long, value_name = "DIR")]
    pub local_root: Option<PathBuf>,

    /// GCMD keyword URL used for variables that lack one
    #[arg(long, value_name = "URL", conflicts_with = "interactive")]
    pub gcmd_default: Option<String>,

    /// Prompt for GCMD keyword URLs that datasets lack
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Credentials file with github-username and github-token
    #[arg(long, value_name = "FILE")]
    pub gitaccess: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct GenerateConfigArgs {
    /// Output directory for the templates (must exist)
    #[arg(long, short = 'o', default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct LintArgs {
    /// Dataset identifier, e.g. "cube.zarr"
    pub dataset_id: String,

    /// Open the dataset from this local directory instead of object storage
    #[arg(long, value_name = "DIR")]
    pub local_root: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Target environment override
    #[arg(long, short = 'e')]
    pub environment: Option<Environment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_publish_args() {
        let cli = Cli::try_parse_from([
            "deep-code",
            "publish",
            "dataset.yaml",
            "workflow.yaml",
            "-e",
            "staging",
            "--write-to-disk",
            "repo",
        ])
        .unwrap();

        match cli.command {
            Commands::Publish(args) => {
                assert_eq!(args.environment, Some(Environment::Staging));
                assert_eq!(args.write_to_disk, Some(PathBuf::from("repo")));
                assert!(args.output_dir.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_environment() {
        let result = Cli::try_parse_from([
            "deep-code", "publish", "d.yaml", "w.yaml", "-e", "qa",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_dir_requires_write_to_disk() {
        let result = Cli::try_parse_from([
            "deep-code", "publish", "d.yaml", "w.yaml", "--output-dir", "out",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["deep-code", "generate-config", "--json", "--dry-run"]).unwrap();
        assert!(cli.json);
        assert!(cli.dry_run);
    }
}
