pub mod logging;
pub mod output;

use clap::{Parser, Subcommand};
use output::{ClassView, to_json};
use phpscope_api::ClassName;
use phpscope_reflection::{
    ClassReflector, FileSourceLocator, Reflector, ReflectorBuilder, ReflectorConfig,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "phpscope",
    version,
    about = "Static reflection and type inference for PHP source",
    long_about = "Phpscope reflects PHP classes, interfaces and traits from source without running \
                  them, and infers the type of whatever sits at a byte offset. Results are printed \
                  as JSON."
)]
pub struct Cli {
    /// JSON reflector configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory searched for `<ShortName>.php` class files (repeatable)
    #[arg(long = "source", global = true, value_name = "DIR")]
    pub sources: Vec<PathBuf>,

    /// Cache reflections for the lifetime of the command
    #[arg(long, global = true)]
    pub cache: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reflect a class-like and print its merged members
    Reflect {
        /// Fully qualified class name, e.g. Acme\\Blog\\Post
        #[arg(value_name = "CLASS")]
        class: String,
    },
    /// Resolve the symbol at a byte offset of a file
    #[command(
        long_about = "Parses the file, builds the frame of the scope around the offset and resolves \
                      the node there. Classes declared in the file itself can be resolved, and its \
                      directory is searched when no --source is given."
    )]
    Offset {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(value_name = "OFFSET")]
        offset: usize,
    },
    /// Resolve the arguments of the call around a byte offset of a file
    Args {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(value_name = "OFFSET")]
        offset: usize,
    },
    /// Print the variable and property bindings of a method body
    Frame {
        #[arg(value_name = "CLASS")]
        class: String,
        #[arg(value_name = "METHOD")]
        method: String,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.verbose, cli.log_dir.as_deref());
    let output = execute(&cli)?;
    println!("{}", output);
    Ok(())
}

/// Run a parsed command and return the JSON it produces.
pub fn execute(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            ReflectorConfig::from_json_file(path)?
        }
        None => ReflectorConfig::default(),
    };

    match &cli.command {
        Commands::Reflect { class } => {
            let reflector = reflector(cli, &config, None).build();
            let reflected = reflector.reflect_class_like(&ClassName::new(class.as_str()))?;
            Ok(to_json(&ClassView::from(reflected.as_ref()))?)
        }
        Commands::Offset { file, offset } => {
            let source = std::fs::read_to_string(file)?;
            let reflector = reflector(cli, &config, file.parent())
                .enable_contextual_source_location()
                .build();
            info!("Resolving offset {} of {}", offset, file.display());
            let reflected = reflector.reflect_offset(source, *offset)?;
            Ok(to_json(&reflected)?)
        }
        Commands::Args { file, offset } => {
            let source = std::fs::read_to_string(file)?;
            let reflector = reflector(cli, &config, file.parent())
                .enable_contextual_source_location()
                .build();
            let arguments = reflector.reflect_arguments(source, *offset)?;
            let arguments: Vec<_> = arguments.iter().collect();
            Ok(to_json(&arguments)?)
        }
        Commands::Frame { class, method } => {
            let reflector = reflector(cli, &config, None).build();
            let frame = reflector.reflect_method_frame(&ClassName::new(class.as_str()), method)?;
            Ok(to_json(&frame)?)
        }
    }
}

/// Flags add to the configuration file; `fallback_root` is only searched
/// when neither names a source directory.
fn reflector(cli: &Cli, config: &ReflectorConfig, fallback_root: Option<&Path>) -> ReflectorBuilder {
    let mut builder = Reflector::builder().with_config(config);

    if cli.cache {
        builder = builder.enable_cache();
    }
    if !cli.sources.is_empty() {
        builder = builder.add_locator(FileSourceLocator::new(cli.sources.iter().cloned()));
    } else if config.source_paths.is_empty() {
        if let Some(root) = fallback_root {
            builder = builder.add_locator(FileSourceLocator::new([root.to_path_buf()]));
        }
    }

    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("phpscope").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let parsed = cli(&["reflect", "Acme\\Post", "--cache", "--source", "src", "-v"]);
        assert!(parsed.cache);
        assert!(parsed.verbose);
        assert_eq!(parsed.sources, vec![PathBuf::from("src")]);
        assert!(matches!(parsed.command, Commands::Reflect { ref class } if class == "Acme\\Post"));
    }

    #[test]
    fn test_reflect_from_source_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Post.php"),
            "<?php\nnamespace Blog;\nclass Post { public function title(): string {} }\n",
        )
        .unwrap();
        let root = dir.path().to_string_lossy().to_string();

        let output = execute(&cli(&["--source", &root, "reflect", "Blog\\Post"])).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["name"], "Blog\\Post");
        assert_eq!(json["methods"][0]["name"], "title");
        assert_eq!(json["methods"][0]["return_type"], "string");
    }

    #[test]
    fn test_offset_uses_the_file_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Author.php"), "<?php\nclass Author {}\n").unwrap();
        let script = "<?php\n$author = new Author();\n$author;\n";
        let file = dir.path().join("script.php");
        std::fs::write(&file, script).unwrap();

        let offset = script.rfind("$author").unwrap() + 1;
        let output = execute(&cli(&[
            "offset",
            &file.to_string_lossy(),
            &offset.to_string(),
        ]))
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["symbol_context"]["symbol"]["name"], "author");
    }

    #[test]
    fn test_args_resolves_call_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let script = "<?php\n$title = 'Hello';\npublish($title, 3);\n";
        let file = dir.path().join("script.php");
        std::fs::write(&file, script).unwrap();

        let offset = script.find("3)").unwrap();
        let output = execute(&cli(&["args", &file.to_string_lossy(), &offset.to_string()])).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json[0]["name"], "title");
        assert_eq!(json[0]["symbol_context"]["types"][0]["type"], "string");
        assert_eq!(json[1]["name"], "argument1");
        assert_eq!(json[1]["symbol_context"]["types"][0]["type"], "int");
    }

    #[test]
    fn test_frame_for_missing_method_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Post.php"), "<?php\nclass Post {}\n").unwrap();
        let root = dir.path().to_string_lossy().to_string();

        assert!(execute(&cli(&["--source", &root, "frame", "Post", "publish"])).is_err());
    }
}
