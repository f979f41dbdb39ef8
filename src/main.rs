use clap::{Parser as ClapParser, Subcommand};
use prospero::analysis::ScriptSurvey;
use prospero::config::Config;
use prospero::error::CompilerError;
use prospero::lexer::Scanner;
use prospero::Script;
use std::fs;
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(author, version, about = "Prospero scene-script compiler front end")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a script and print its syntax tree as JSON
    Parse {
        /// Path to a .pro script
        script: PathBuf,
    },
    /// Print the token stream of a script
    Tokens {
        /// Path to a .pro script
        script: PathBuf,
    },
    /// Parse every .pro script in the scripts directory
    Check,
    /// Survey scene, clip, and jump usage across the scripts directory
    Stats,
    /// Manage prospero configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Edit the RC file for the current environment
    Edit,
    /// Show the current RC file contents
    Show,
    /// Initialize a new RC file with defaults
    Init,
    /// List all environment variables and aliases
    List,
}

fn get_pro_files(config: &Config) -> Result<Vec<PathBuf>, CompilerError> {
    let scripts_path = &config.scripts_dir;

    if !scripts_path.exists() {
        return Err(CompilerError::FileNotFound(format!(
            "Scripts directory not found: {}\n\nTo fix this:\n1. Create the directory\n2. Add your .pro files there\n3. Or set PROSPERO_SCRIPTS_DIR in your RC file (prospero config edit)",
            scripts_path.display()
        )));
    }

    if !scripts_path.is_dir() {
        return Err(CompilerError::FileNotFound(format!(
            "Expected {} to be a directory",
            scripts_path.display()
        )));
    }

    let mut found_scripts: Vec<PathBuf> = Vec::new();
    let files = fs::read_dir(scripts_path).map_err(|e| {
        CompilerError::FileNotFound(format!(
            "Cannot access scripts directory: {}\nError: {}",
            scripts_path.display(),
            e
        ))
    })?;

    for entry in files.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("pro") {
            found_scripts.push(path);
        }
    }

    if found_scripts.is_empty() {
        return Err(CompilerError::FileNotFound(format!(
            "No .pro files found in: {}\n\nTo fix this:\n1. Add your Prospero (.pro) scripts to this directory\n2. Or set PROSPERO_SCRIPTS_DIR in your RC file (prospero config edit)",
            scripts_path.display()
        )));
    }

    found_scripts.sort();
    Ok(found_scripts)
}

fn process_pro_file(path: &PathBuf) -> Result<Script, CompilerError> {
    let source = fs::read_to_string(path)?;
    prospero::compile(&source)
}

fn check_scripts(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let scripts = match get_pro_files(config) {
        Ok(scripts) => scripts,
        Err(CompilerError::FileNotFound(msg)) => {
            println!("Error: {}", msg);
            println!("\nCurrent configuration:");
            println!("  Environment: {}", config.env_name);
            println!("  Scripts directory: {}", config.scripts_dir.display());
            return Ok(());
        }
        Err(e) => return Err(Box::new(e)),
    };

    let mut failures = 0;
    for path in &scripts {
        match process_pro_file(path) {
            Ok(script) => {
                println!("ok   {} ({} scenes)", path.display(), script.len());
            }
            Err(e) => {
                failures += 1;
                println!("FAIL {}", path.display());
                print!("{}", e);
            }
        }
    }
    println!("\n{} script(s), {} failure(s)", scripts.len(), failures);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Commands::Parse { script } => {
            let parsed = process_pro_file(&script)?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Commands::Tokens { script } => {
            let source = fs::read_to_string(&script)?;
            let tokens = Scanner::new(&source)
                .tokenize()
                .map_err(CompilerError::Lexical)?;
            for token in &tokens {
                println!("{:>4} {}", token.line, token);
            }
        }
        Commands::Check => {
            check_scripts(&config)?;
        }
        Commands::Stats => {
            let mut survey = ScriptSurvey::new();
            match survey.survey_directory(&config.scripts_dir) {
                Ok(_) => survey.print_survey(),
                Err(e) => println!("Error surveying scripts: {}", e),
            }
        }
        Commands::Config { command } => match command {
            ConfigCommands::Edit => {
                let editor = std::env::var("EDITOR").unwrap_or_else(|_| {
                    if cfg!(windows) {
                        String::from("notepad")
                    } else {
                        String::from("nano")
                    }
                });

                let rc_path = Config::get_rc_path();
                if !rc_path.exists() {
                    Config::load_rc_file()?;
                }

                std::process::Command::new(editor).arg(rc_path).status()?;
            }
            ConfigCommands::Show => {
                let contents = Config::load_rc_file()?;
                println!("{}", contents);
            }
            ConfigCommands::Init => {
                let rc_path = Config::get_rc_path();
                if rc_path.exists() {
                    println!("RC file already exists at: {}", rc_path.display());
                    println!("Use 'prospero config edit' to modify it or remove the file to reinitialize.");
                } else {
                    Config::load_rc_file()?;
                    println!("Initialized new RC file at: {}", rc_path.display());
                    println!("Use 'prospero config edit' to modify it.");
                }
            }
            ConfigCommands::List => {
                let contents = Config::load_rc_file()?;
                let (aliases, env_vars) = Config::parse_rc_file(&contents);

                println!("Environment: {}", config.env_name);
                println!("\nEnvironment Variables:");
                for (key, value) in env_vars {
                    println!("  {}={}", key, value);
                }

                println!("\nAliases:");
                for alias in aliases {
                    println!("  {}", alias);
                }
            }
        },
    }

    Ok(())
}
