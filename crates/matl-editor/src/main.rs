//! Material editor command line entry point

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use matl_core::{RonFormat, SerializeError, load_matl};
use matl_editor::{ConfigManager, MaterialEditor, SaveError, create_shared_config};
use matl_renderer::{ModelAsset, resolve_materials};

const USAGE: &str = "usage:
  matl-editor check <matl.ron>
  matl-editor resave <in.ron> <out.ron>
  matl-editor textures";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(&'static str),
    #[error(transparent)]
    Load(#[from] SerializeError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("{0} material records could not be resolved")]
    Unresolved(usize),
}

fn main() -> ExitCode {
    matl_editor::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let shared = create_shared_config();
    let config = shared.read();

    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["check", matl] => check(Path::new(matl), &*config),
        ["resave", input, output] => resave(Path::new(input), PathBuf::from(output), &*config),
        ["textures"] => {
            for name in config.config().editor.default_texture_names() {
                println!("{}", name);
            }
            Ok(())
        }
        _ => Err(CliError::Usage(USAGE)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(usage)) => {
            eprintln!("{}", usage);
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Resolve every record and report those that cannot be rendered.
fn check(path: &Path, config: &ConfigManager) -> Result<(), CliError> {
    let matl = load_matl(path)?;
    let resolved = resolve_materials(Some(&matl), &HashMap::new(), &config.config().materials);

    println!(
        "{}: {} records, {} materials",
        path.display(),
        matl.entries.len(),
        resolved.materials.len()
    );
    for error in &resolved.errors {
        println!("  {}", error);
    }

    if resolved.errors.is_empty() {
        Ok(())
    } else {
        Err(CliError::Unresolved(resolved.errors.len()))
    }
}

/// Open a material file in an editing session and save it unchanged.
fn resave(input: &Path, output: PathBuf, config: &ConfigManager) -> Result<(), CliError> {
    let settings = config.config();
    let matl = load_matl(input)?;
    let asset = Arc::new(ModelAsset::new(None, Some(matl), None, HashMap::new(), &settings.materials));

    let editor = MaterialEditor::new(
        [(input.display().to_string(), asset)],
        &settings.editor.default_texture_names(),
        &settings.materials,
    );
    let saved = editor.save_current(&output, &RonFormat)?;
    println!("{}: wrote {} records", output.display(), saved.entries.len());
    Ok(())
}
